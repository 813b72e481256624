use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use super::model::ModelContext;

/// Readiness slot for the shared [`ModelContext`].
///
/// Empty until the load phase publishes a context; from then on every clone hands out
/// the same `Arc`. A context is published at most once, so requests never observe a
/// partially built or swapped model.
#[derive(Debug, Clone)]
pub struct ContextHandle {
    tx: Arc<watch::Sender<Option<Arc<ModelContext>>>>,
    rx: watch::Receiver<Option<Arc<ModelContext>>>,
}

impl Default for ContextHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextHandle {
    /// Creates an empty (not ready) handle.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Creates a handle that is ready immediately.
    pub fn ready(context: ModelContext) -> Self {
        let handle = Self::new();
        handle.publish(context);
        handle
    }

    /// Publishes the loaded context. Returns `false` (and drops `context`) if one was
    /// already published.
    pub fn publish(&self, context: ModelContext) -> bool {
        let context = Arc::new(context);
        let published = self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(Arc::clone(&context));
            true
        });

        if published {
            info!(
                n_users = context.n_users(),
                n_items = context.n_items(),
                "Model context published"
            );
        } else {
            warn!("Model context already published, ignoring second publish");
        }
        published
    }

    /// Returns the context if loading has finished.
    pub fn get(&self) -> Option<Arc<ModelContext>> {
        self.rx.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Waits until a context is published.
    pub async fn wait_ready(&self) -> Arc<ModelContext> {
        let mut rx = self.rx.clone();
        loop {
            if let Some(context) = rx.borrow_and_update().clone() {
                return context;
            }
            // The sender lives as long as `self`, so `changed` cannot fail here.
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

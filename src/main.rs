//! Asset recommender HTTP server entrypoint.

use std::net::SocketAddr;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;

use assetrec::config::Config;
use assetrec::context::{ContextHandle, ModelContext};
use assetrec::gateway::{HandlerState, create_router_with_state};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        checkpoint = ?config.checkpoint_path,
        max_top_k = config.max_top_k,
        scoring_batch_size = config.scoring_batch_size,
        scoring_shards = config.scoring_shards,
        "assetrec starting"
    );

    let context = ContextHandle::new();
    let state = HandlerState::from_config(context.clone(), &config);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening (model loading)");

    let (load_failed_tx, load_failed_rx) = oneshot::channel();
    let loader = tokio::spawn(load_model(config, context, load_failed_tx));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(load_failed_rx))
        .await?;

    if loader.is_finished() {
        loader.await??;
    } else {
        tracing::warn!("Shut down before the model finished loading");
        loader.abort();
    }

    tracing::info!("assetrec shutdown complete");
    Ok(())
}

/// Loads the model on the blocking pool and publishes it. Any failure is fatal.
async fn load_model(
    config: Config,
    context: ContextHandle,
    load_failed: oneshot::Sender<()>,
) -> anyhow::Result<()> {
    let loaded = tokio::task::spawn_blocking(move || ModelContext::from_config(&config)).await;

    match loaded {
        Ok(Ok(model)) => {
            context.publish(model);
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Model load failed, shutting down");
            let _ = load_failed.send(());
            Err(e.into())
        }
        Err(e) => {
            tracing::error!(error = %e, "Model load task panicked, shutting down");
            let _ = load_failed.send(());
            Err(e.into())
        }
    }
}

fn run_health_check() -> i32 {
    let port = std::env::var("ASSETREC_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal(load_failed: oneshot::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    // The sender is dropped without a message once the model loads successfully.
    let model_failed = async {
        if load_failed.await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = model_failed => {
            tracing::info!("Stopping server after failed model load");
        }
    }
}

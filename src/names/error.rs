use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NameSourceError {
    #[error("failed to read asset names from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid asset name data in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

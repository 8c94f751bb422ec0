use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TyperError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stream error: {0}")]
    Stream(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TyperError>;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, PersistError>;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("models error: {0}")]
    Models(#[from] models::Error),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

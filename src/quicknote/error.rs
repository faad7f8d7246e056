use crate::model::DocumentId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuicknoteError {
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, QuicknoteError>;

//! Error types for the feed core.

use crate::types::PostId;
use thiserror::Error;

/// Main error type for feed operations.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    #[error("Store is closed")]
    StoreClosed,

    #[error("Media root is locked by another process")]
    Locked,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Serialization(e.to_string())
    }
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;

//! Error types for the fetch-and-display cycle

use thiserror::Error;

/// Failures raised by an object store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("listing bucket '{bucket}' failed: {message}")]
    List { bucket: String, message: String },

    #[error("reading object '{key}' failed: {message}")]
    Get { key: String, message: String },

    #[error("bucket '{0}' does not exist")]
    NoSuchBucket(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures that abort a whole fetch cycle
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("listing failed: {0}")]
    Listing(#[source] StoreError),

    #[error("fetching '{key}' failed: {reason}")]
    Fetch { key: String, reason: String },

    #[error("rendering failed: {0}")]
    Render(String),
}

impl PipelineError {
    /// Wrap a store error raised while fetching a single object
    pub fn fetch(key: &str, err: impl std::fmt::Display) -> Self {
        Self::Fetch {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }

    /// Short category name, used in logs and tool output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Listing(_) => "listing",
            Self::Fetch { .. } => "fetch",
            Self::Render(_) => "render",
        }
    }
}

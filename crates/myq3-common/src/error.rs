// error.rs -- error types for level loading and configuration

use std::io;

/// Failure while loading or querying a collision model.
///
/// Every variant is fatal to the load in progress: nothing is retried and no
/// partially decoded model is handed back.
#[derive(Debug, thiserror::Error)]
pub enum CollisionError {
    /// Bad name, handle or index supplied by the caller
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The level file could not be read
    #[error("couldn't load {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Wrong version, truncated data or out-of-range lump contents
    #[error("format error: {0}")]
    Format(String),
}

impl CollisionError {
    pub fn format(msg: impl Into<String>) -> Self {
        CollisionError::Format(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        CollisionError::InvalidArgument(msg.into())
    }
}

pub type CmResult<T> = Result<T, CollisionError>;

//! Error types for the directory watcher.

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Errors that can occur in the directory watcher.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Directory not found.
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    /// The watch path exists but is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Invalid filter pattern.
    #[error("invalid filter pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Watcher already running.
    #[error("watcher already running for: {0}")]
    AlreadyWatching(String),

    /// Notify error.
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatcherError {
    /// Whether this error stems from the watch configuration itself rather
    /// than from registering with the OS notification facility.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DirectoryNotFound(_) | Self::NotADirectory(_) | Self::InvalidPattern { .. }
        )
    }
}

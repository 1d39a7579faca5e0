//! Error types for the service.

use std::path::PathBuf;

use dirmail_directory_watcher::WatcherError;
use dirmail_notifier::MailError;
use thiserror::Error;

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Startup and configuration errors. All of them are fatal to the service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Config file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or misses a section.
    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Mail section is unusable.
    #[error("invalid mail configuration: {0}")]
    Mail(#[from] MailError),

    /// Watch section is unusable.
    #[error("invalid watch configuration: {0}")]
    Watch(#[source] WatcherError),

    /// The OS refused the watch registration.
    #[error("failed to register directory watch: {0}")]
    WatchRegistration(#[source] WatcherError),

    /// Startup was cancelled by the host.
    #[error("startup cancelled")]
    Cancelled,
}

impl ServiceError {
    /// Whether the configuration itself is at fault.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigRead { .. }
                | Self::ConfigParse(_)
                | Self::Configuration(_)
                | Self::Mail(_)
                | Self::Watch(_)
        )
    }
}

impl From<WatcherError> for ServiceError {
    fn from(e: WatcherError) -> Self {
        if e.is_configuration() {
            Self::Watch(e)
        } else {
            Self::WatchRegistration(e)
        }
    }
}

//! Service configuration file.

use std::path::{Path, PathBuf};

use dirmail_directory_watcher::{DEFAULT_EVENT_CAPACITY, WatchConfig};
use dirmail_notifier::MailConfig;
use serde::Deserialize;

use crate::error::{Result, ServiceError};

/// Default number of notifications allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENT_NOTIFICATIONS: usize = 4;

/// Everything the service needs, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// What to watch.
    pub directory_watcher: WatchConfig,

    /// Where and what to send.
    pub mail_config: MailConfig,

    /// Event dispatch tuning.
    #[serde(default)]
    pub service: DispatchConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Assemble a config from its two required sections.
    pub fn new(directory_watcher: WatchConfig, mail_config: MailConfig) -> Self {
        Self {
            directory_watcher,
            mail_config,
            service: DispatchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ServiceError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    /// Parse from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Check both sections as startup would, without registering anything.
    pub fn validate(&self) -> Result<()> {
        self.mail_config.validate()?;
        self.directory_watcher.validate()?;
        Ok(())
    }
}

/// Event dispatch tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Upper bound on notifications being sent at the same time. `0` means
    /// unbounded.
    ///
    /// While the bound is reached, later events wait in the event channel,
    /// so as many stalled SMTP sessions hold up every later notification.
    pub max_concurrent_notifications: usize,

    /// Events buffered between the watcher and the dispatcher.
    pub event_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_notifications: DEFAULT_MAX_CONCURRENT_NOTIFICATIONS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Log output settings. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `dirmail_service=debug,info`.
    pub level: String,

    /// Also write logs to this file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

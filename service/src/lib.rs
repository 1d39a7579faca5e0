//! # dirmail service
//!
//! Long-running service that e-mails every new file dropped into a watched
//! directory.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        WatchService                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  DirectoryWatcher ──► dispatch loop ──► Notifier ──► SMTP        │
//! │        │                    │               │                   │
//! │        ▼                    ▼               ▼                   │
//! │   EventStream        Semaphore (N)    error logged, dropped     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lifecycle: `Stopped → Starting → Running → Stopping → Stopped`. Startup
//! failures are returned to the host; per-file failures are only logged.

pub mod config;
pub mod error;
pub mod logging;
pub mod service;

pub use config::{DispatchConfig, LoggingConfig, ServiceConfig};
pub use error::{Result, ServiceError};
pub use service::{ServiceState, WatchService};

// Re-export from dependencies for convenience
pub use dirmail_directory_watcher::{FileCreatedEvent, WatchConfig};
pub use dirmail_notifier::{MailConfig, MailDeliveryError, MailTransport, Notifier};

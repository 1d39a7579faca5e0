//! # Notifier
//!
//! Sends one e-mail per newly created file, with the file attached.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Notifier                                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  FileCreatedEvent ──► compose ──► OutgoingMessage               │
//! │                                        │                        │
//! │  MailConfig ──► MailEnvelope           ▼                        │
//! │                                  MailTransport (SMTP)           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Subject and body come verbatim from [`MailConfig`]; the file is read when
//! the notification is composed, so a file still being written is attached
//! as it is at that moment.

pub mod config;
pub mod error;
pub mod message;
pub mod notifier;
pub mod transport;

pub use config::{DEFAULT_SMTP_PORT, MailConfig, MailEnvelope, split_addresses};
pub use error::{MailDeliveryError, MailError};
pub use message::{AttachmentFile, OutgoingMessage};
pub use notifier::Notifier;
pub use transport::{MailTransport, SmtpMailTransport};

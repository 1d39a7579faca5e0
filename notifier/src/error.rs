//! Error types for the notifier.

use std::path::PathBuf;

use lettre::address::AddressError;
use thiserror::Error;

/// Mail configuration errors, detected before any notification is sent.
#[derive(Error, Debug)]
pub enum MailError {
    /// No recipient addresses configured.
    #[error("no recipients configured")]
    NoRecipients,

    /// A sender or recipient is not a valid mailbox.
    #[error("invalid mailbox address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },

    /// Host or port unusable.
    #[error("invalid SMTP endpoint: {0}")]
    InvalidEndpoint(String),

    /// TLS parameters could not be built.
    #[error("TLS setup failed: {0}")]
    Tls(#[source] lettre::transport::smtp::Error),
}

/// Failure while building or sending one notification.
#[derive(Error, Debug)]
pub enum MailDeliveryError {
    /// The triggering file vanished or could not be read.
    #[error("failed to read attachment {}: {source}", path.display())]
    AttachmentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The attachment content type was rejected.
    #[error("invalid attachment content type {content_type:?}: {reason}")]
    ContentType {
        content_type: String,
        reason: String,
    },

    /// Message assembly error.
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// Connection, TLS, authentication or submission failure.
    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

impl MailDeliveryError {
    /// Whether the attachment could not be read.
    pub fn is_attachment_error(&self) -> bool {
        matches!(self, Self::AttachmentRead { .. })
    }

    /// Whether the failure happened talking to the SMTP server.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

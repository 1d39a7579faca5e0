//! Notification message composition.

use std::path::Path;

use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};

use crate::error::MailDeliveryError;

/// File name used when the path has no usable final component.
const FALLBACK_FILE_NAME: &str = "attachment";

/// The new file, as attached to a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentFile {
    /// Name shown to recipients.
    pub file_name: String,

    /// MIME type guessed from the extension.
    pub content_type: ContentType,

    /// File content at the time it was read.
    pub bytes: Vec<u8>,
}

impl AttachmentFile {
    /// Read `path` now and wrap its current bytes.
    pub async fn read(path: &Path) -> Result<Self, MailDeliveryError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| MailDeliveryError::AttachmentRead {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            file_name: file_name(path),
            content_type: content_type_for(path)?,
            bytes,
        })
    }
}

/// One notification, ready to be turned into a MIME message.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    /// Sender.
    pub from: Mailbox,

    /// All recipients of the single message.
    pub to: Vec<Mailbox>,

    /// Subject line.
    pub subject: String,

    /// Plain text body.
    pub text_body: String,

    /// The new file.
    pub attachment: AttachmentFile,
}

impl OutgoingMessage {
    /// Build a `multipart/mixed` message: the text body followed by the file.
    pub fn into_message(self) -> Result<Message, MailDeliveryError> {
        let mut builder = Message::builder().from(self.from).subject(self.subject);
        for to in self.to {
            builder = builder.to(to);
        }

        let attachment = Attachment::new(self.attachment.file_name)
            .body(self.attachment.bytes, self.attachment.content_type);

        let message = builder.multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(self.text_body))
                .singlepart(attachment),
        )?;

        Ok(message)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

fn content_type_for(path: &Path) -> Result<ContentType, MailDeliveryError> {
    let guessed = mime_guess::from_path(path).first_or_octet_stream();

    ContentType::parse(guessed.essence_str()).map_err(|e| MailDeliveryError::ContentType {
        content_type: guessed.to_string(),
        reason: e.to_string(),
    })
}

//! Turns a file event into a sent notification.

use std::sync::Arc;

use dirmail_directory_watcher::FileCreatedEvent;
use tracing::debug;

use crate::config::{MailConfig, MailEnvelope};
use crate::error::{MailDeliveryError, MailError};
use crate::message::{AttachmentFile, OutgoingMessage};
use crate::transport::{MailTransport, SmtpMailTransport};

/// Sends one e-mail per new file.
///
/// Holds only read-only state, so a single instance behind an [`Arc`] can
/// serve overlapping notifications.
pub struct Notifier {
    /// Parsed sender and recipients.
    envelope: MailEnvelope,

    /// Subject line.
    subject: String,

    /// Plain text body.
    body: String,

    /// Where finished messages go.
    transport: Arc<dyn MailTransport>,
}

impl Notifier {
    /// Create a notifier that submits over SMTP.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let transport = SmtpMailTransport::new(config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a notifier with a custom transport.
    pub fn with_transport(
        config: &MailConfig,
        transport: Arc<dyn MailTransport>,
    ) -> Result<Self, MailError> {
        Ok(Self {
            envelope: config.validate()?,
            subject: config.subject.clone(),
            body: config.body.clone(),
            transport,
        })
    }

    /// Recipients every notification is addressed to.
    pub fn envelope(&self) -> &MailEnvelope {
        &self.envelope
    }

    /// Build the notification for `event`, reading the file as it is now.
    pub async fn compose(
        &self,
        event: &FileCreatedEvent,
    ) -> Result<OutgoingMessage, MailDeliveryError> {
        let attachment = AttachmentFile::read(event.path()).await?;

        Ok(OutgoingMessage {
            from: self.envelope.from.clone(),
            to: self.envelope.to.clone(),
            subject: self.subject.clone(),
            text_body: self.body.clone(),
            attachment,
        })
    }

    /// Compose and send the notification for `event`.
    ///
    /// No retry is attempted.
    pub async fn notify(&self, event: &FileCreatedEvent) -> Result<(), MailDeliveryError> {
        let outgoing = self.compose(event).await?;
        debug!(
            "Sending {} ({} bytes) to {} recipient(s)",
            outgoing.attachment.file_name,
            outgoing.attachment.bytes.len(),
            outgoing.to.len()
        );

        self.transport.send(outgoing.into_message()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lettre::Message;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, message: Message) -> Result<(), MailDeliveryError> {
            self.sent.lock().await.push(message);
            Ok(())
        }
    }

    fn config() -> MailConfig {
        MailConfig::new("watcher@x.com", "a@x.com;b@x.com", "smtp.x.com", 25)
            .with_template("New report", "A new report has arrived.")
            .with_credentials("watcher", "secret")
    }

    #[tokio::test]
    async fn test_compose_uses_static_template() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.txt");
        std::fs::write(&path, "numbers").unwrap();

        let notifier =
            Notifier::with_transport(&config(), Arc::new(RecordingTransport::default())).unwrap();
        let outgoing = notifier
            .compose(&FileCreatedEvent::new(&path))
            .await
            .unwrap();

        assert_eq!(outgoing.subject, "New report");
        assert_eq!(outgoing.text_body, "A new report has arrived.");
        assert_eq!(outgoing.from.email.to_string(), "watcher@x.com");
        assert_eq!(outgoing.to.len(), 2);
        assert_eq!(outgoing.attachment.file_name, "report.txt");
        assert_eq!(outgoing.attachment.bytes, b"numbers");
    }

    #[tokio::test]
    async fn test_notify_sends_one_message_to_all_recipients() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.txt");
        std::fs::write(&path, "numbers").unwrap();

        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::with_transport(&config(), transport.clone()).unwrap();

        tokio_test::assert_ok!(notifier.notify(&FileCreatedEvent::new(&path)).await);

        let sent = transport.sent.lock().await;
        assert_eq!(sent.len(), 1);

        let recipients: Vec<String> = sent[0]
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(recipients, vec!["a@x.com", "b@x.com"]);
    }

    #[tokio::test]
    async fn test_notify_missing_file_sends_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let transport = Arc::new(RecordingTransport::default());
        let notifier = Notifier::with_transport(&config(), transport.clone()).unwrap();

        let err = notifier
            .notify(&FileCreatedEvent::new(temp_dir.path().join("gone.txt")))
            .await
            .unwrap_err();

        assert!(err.is_attachment_error());
        assert!(transport.sent.lock().await.is_empty());
    }

    /// Minimal plaintext SMTP server. Records the commands of each session.
    async fn serve_smtp(listener: TcpListener, sessions: Arc<Mutex<Vec<Vec<String>>>>) {
        while let Ok((stream, _)) = listener.accept().await {
            sessions.lock().await.push(Vec::new());
            let record = |command: String| {
                let sessions = sessions.clone();
                async move {
                    if let Some(session) = sessions.lock().await.last_mut() {
                        session.push(command);
                    }
                }
            };

            let (reader, mut writer) = stream.into_split();
            let mut lines = BufReader::new(reader).lines();
            writer.write_all(b"220 localhost ESMTP\r\n").await.unwrap();

            let mut in_data = false;
            while let Ok(Some(line)) = lines.next_line().await {
                if in_data {
                    if line == "." {
                        in_data = false;
                        record("<END DATA>".to_string()).await;
                        writer.write_all(b"250 2.0.0 Queued\r\n").await.unwrap();
                    }
                    continue;
                }

                let reply: &[u8] = if line.starts_with("EHLO") {
                    record("EHLO".to_string()).await;
                    b"250-localhost\r\n250 AUTH PLAIN LOGIN\r\n"
                } else if line.starts_with("AUTH") {
                    record(line).await;
                    b"235 2.7.0 Authentication successful\r\n"
                } else if line == "DATA" {
                    in_data = true;
                    record(line).await;
                    b"354 End data with <CR><LF>.<CR><LF>\r\n"
                } else if line == "QUIT" {
                    record(line).await;
                    writer.write_all(b"221 2.0.0 Bye\r\n").await.unwrap();
                    break;
                } else {
                    record(line).await;
                    b"250 2.1.0 Ok\r\n"
                };
                writer.write_all(reply).await.unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_smtp_session_per_notification() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let sessions = Arc::new(Mutex::new(Vec::new()));
        let server = tokio::spawn(serve_smtp(listener, sessions.clone()));

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.txt");
        std::fs::write(&path, "numbers").unwrap();

        let config = MailConfig::new("watcher@x.com", "a@x.com;b@x.com", "127.0.0.1", port)
            .with_credentials("watcher", "secret");
        let notifier = Notifier::new(&config).unwrap();

        for _ in 0..2 {
            tokio_test::assert_ok!(notifier.notify(&FileCreatedEvent::new(&path)).await);
        }

        let expected = vec![
            "EHLO",
            // base64("\0watcher\0secret")
            "AUTH PLAIN AHdhdGNoZXIAc2VjcmV0",
            "MAIL FROM:<watcher@x.com>",
            "RCPT TO:<a@x.com>",
            "RCPT TO:<b@x.com>",
            "DATA",
            "<END DATA>",
            "QUIT",
        ];
        let sessions = sessions.lock().await.clone();
        assert_eq!(sessions, vec![expected.clone(), expected]);

        server.abort();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = config();
        config.from_address = "nobody".to_string();

        let result = Notifier::with_transport(&config, Arc::new(RecordingTransport::default()));
        assert!(matches!(result, Err(MailError::InvalidAddress { .. })));
    }
}

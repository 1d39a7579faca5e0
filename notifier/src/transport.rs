//! Mail transports.
//!
//! [`SmtpMailTransport`] talks to a real server. Tests substitute their own
//! [`MailTransport`] to capture messages instead.

use async_trait::async_trait;
use lettre::message::Message;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::debug;

use crate::config::MailConfig;
use crate::error::{MailDeliveryError, MailError};

/// Submits a finished message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver `message` to every recipient in its envelope, or fail as a whole.
    async fn send(&self, message: Message) -> Result<(), MailDeliveryError>;
}

/// SMTP submission over tokio.
///
/// Each [`send`](MailTransport::send) opens its own connection,
/// authenticates, submits and closes with `QUIT`. With `use_tls` the
/// connection is TLS from the first byte; otherwise STARTTLS is used when
/// the server offers it.
///
/// Server certificates and host names are NOT verified. This mirrors the
/// deployment this service was built for (a trusted internal relay with a
/// self-signed certificate) and leaves credentials exposed to anyone who can
/// intercept the connection.
pub struct SmtpMailTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
    endpoint: String,
}

impl SmtpMailTransport {
    /// Build a transport for the configured endpoint.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let parameters = TlsParameters::builder(config.host.clone())
            .dangerous_accept_invalid_certs(true)
            .build()
            .map_err(MailError::Tls)?;

        let tls = if config.use_tls {
            Tls::Wrapper(parameters)
        } else {
            Tls::Opportunistic(parameters)
        };

        let inner = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.as_str())
            .port(config.port)
            .tls(tls)
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            inner,
            endpoint: format!("{}:{}", config.host, config.port),
        })
    }

    /// `host:port` this transport connects to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, message: Message) -> Result<(), MailDeliveryError> {
        debug!("Submitting message via {}", self.endpoint);

        let response = self.inner.send(message).await?;
        debug!("Server accepted message: {:?}", response.code());

        Ok(())
    }
}

//! Mail configuration.

use std::fmt;

use lettre::message::Mailbox;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::MailError;

/// Default submission port when none is configured.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP endpoint, credentials and the static message template.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailConfig {
    /// Sender mailbox.
    pub from_address: String,

    /// Recipients. Accepts a `;`-delimited string when deserialized.
    #[serde(alias = "to_address", deserialize_with = "deserialize_addresses")]
    pub to_addresses: Vec<String>,

    /// Subject line, used verbatim.
    pub subject: String,

    /// Plain text body, used verbatim.
    #[serde(default, alias = "body_template")]
    pub body: String,

    /// SMTP server host.
    pub host: String,

    /// SMTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect with implicit TLS instead of upgrading via STARTTLS.
    #[serde(default, alias = "use_ssl")]
    pub use_tls: bool,

    /// Login name.
    #[serde(default)]
    pub user: String,

    /// Login password.
    #[serde(default)]
    pub password: String,
}

fn default_port() -> u16 {
    DEFAULT_SMTP_PORT
}

impl MailConfig {
    /// Create a new mail config with an empty template and no credentials.
    pub fn new(
        from_address: impl Into<String>,
        to_addresses: &str,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            from_address: from_address.into(),
            to_addresses: split_addresses(to_addresses),
            subject: String::new(),
            body: String::new(),
            host: host.into(),
            port,
            use_tls: false,
            user: String::new(),
            password: String::new(),
        }
    }

    /// Set the subject and body.
    pub fn with_template(mut self, subject: impl Into<String>, body: impl Into<String>) -> Self {
        self.subject = subject.into();
        self.body = body.into();
        self
    }

    /// Set the login credentials.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Use implicit TLS.
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Parse the addresses and check the endpoint.
    pub fn validate(&self) -> Result<MailEnvelope, MailError> {
        if self.host.trim().is_empty() {
            return Err(MailError::InvalidEndpoint("host is empty".to_string()));
        }

        if self.port == 0 {
            return Err(MailError::InvalidEndpoint("port must be 1-65535".to_string()));
        }

        if self.to_addresses.is_empty() {
            return Err(MailError::NoRecipients);
        }

        let from = parse_mailbox(&self.from_address)?;
        let to = self
            .to_addresses
            .iter()
            .map(|address| parse_mailbox(address))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(MailEnvelope { from, to })
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("from_address", &self.from_address)
            .field("to_addresses", &self.to_addresses)
            .field("subject", &self.subject)
            .field("body", &self.body)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parsed sender and recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailEnvelope {
    /// Sender.
    pub from: Mailbox,

    /// All recipients, in configured order.
    pub to: Vec<Mailbox>,
}

/// Split a `;`-delimited address list, dropping blank entries.
pub fn split_addresses(addresses: &str) -> Vec<String> {
    addresses
        .split(';')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect()
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| MailError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

fn deserialize_addresses<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Addresses {
        Delimited(String),
        List(Vec<String>),
    }

    Ok(match Addresses::deserialize(deserializer)? {
        Addresses::Delimited(addresses) => split_addresses(&addresses),
        Addresses::List(list) => list
            .iter()
            .flat_map(|entry| split_addresses(entry))
            .collect(),
    })
}

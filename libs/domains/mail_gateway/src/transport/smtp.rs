//! SMTP transport using lettre

use super::{Delivery, MailTransport, MimePart, OutboundMessage};
use crate::config::{Encryption, GatewayConfig};
use crate::error::{ConfigurationError, TransportError};
use crate::models::{Priority, Recipient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::{
    message::{
        header::{ContentType, Header, HeaderName, HeaderValue},
        Mailbox, MultiPart, SinglePart,
    },
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::error::Error as StdError;
use std::time::SystemTime;
use tracing::{debug, error, info};

/// SMTP mail transport.
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    port: u16,
}

impl SmtpTransport {
    /// Create a transport from gateway configuration.
    ///
    /// No connection is opened until the first send.
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigurationError> {
        let builder = match config.encryption {
            Encryption::Ssl => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| ConfigurationError::Transport(format!("Failed to create SMTP relay: {}", e)))?,
            Encryption::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| {
                    ConfigurationError::Transport(format!("Failed to create STARTTLS relay: {}", e))
                })?,
            // No TLS (for Mailpit/Mailhog)
            Encryption::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };

        let mut builder = builder.port(config.port);
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            host: config.host.clone(),
            port: config.port,
        })
    }

    /// Build a lettre Message from an OutboundMessage.
    fn build_message(message: &OutboundMessage) -> Result<Message, TransportError> {
        let from = message
            .from()
            .ok_or_else(|| TransportError::InvalidMessage("Message has no sender".to_string()))?;
        let to = message
            .to()
            .ok_or_else(|| TransportError::InvalidMessage("Message has no recipient".to_string()))?;

        let mut builder = Message::builder()
            .from(mailbox("from", from)?)
            .to(mailbox("to", to)?)
            .subject(message.subject().unwrap_or_default());

        if let Some(cc) = message.cc() {
            builder = builder.cc(mailbox("cc", cc)?);
        }
        if let Some(bcc) = message.bcc() {
            builder = builder.bcc(mailbox("bcc", bcc)?);
        }
        if let Some(reply_to) = message.reply_to() {
            let reply_to: Mailbox = reply_to.parse().map_err(|e| {
                TransportError::InvalidMessage(format!("Invalid reply-to address '{}': {}", reply_to, e))
            })?;
            builder = builder.reply_to(reply_to);
        }
        if let Some(return_path) = message.return_path() {
            builder = builder.header(ReturnPath(return_path.to_string()));
        }
        if let Some(id) = message.id() {
            builder = builder.message_id(Some(message_id(id)));
        }
        if let Some(date) = message.date() {
            builder = builder.date(parse_date(date)?);
        }
        if let Some(priority) = message.priority() {
            builder = builder.header(XPriority(priority));
        }

        let primary = message
            .body()
            .ok_or_else(|| TransportError::InvalidMessage("Message has no body".to_string()))?;

        let built = match message.parts().split_first() {
            None => {
                let content_type = content_type(primary.content_type.as_deref().or(message.content_type()))?;
                builder.header(content_type).body(primary.content.clone())
            }
            Some((first, rest)) => {
                if let Some(declared) = message.content_type() {
                    debug!(content_type = %declared, "Ignoring message content type for multipart body");
                }
                // multipart/alternative lists the preferred rendition last
                let mut alternative = MultiPart::alternative().singlepart(single_part(first)?);
                for part in rest {
                    alternative = alternative.singlepart(single_part(part)?);
                }
                builder.multipart(alternative.singlepart(single_part(primary)?))
            }
        };

        built.map_err(|e| TransportError::InvalidMessage(format!("Failed to build email message: {}", e)))
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<Delivery, TransportError> {
        let email = Self::build_message(message)?;
        let accepted = email.envelope().to().len();

        debug!(
            host = %self.host,
            port = %self.port,
            recipients = accepted,
            "Sending email via SMTP"
        );

        let response = self.transport.send(email).await.map_err(|e| {
            error!(host = %self.host, error = %e, "Failed to send email via SMTP");
            classify(&e)
        })?;

        info!(
            code = %response.code(),
            recipients = accepted,
            "Email accepted by SMTP server"
        );

        Ok(Delivery::accepted(accepted))
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        let reachable = self.transport.test_connection().await.map_err(|e| classify(&e))?;
        if reachable {
            Ok(())
        } else {
            Err(TransportError::Connection(format!(
                "SMTP server {}:{} did not answer",
                self.host, self.port
            )))
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

fn classify(err: &lettre::transport::smtp::Error) -> TransportError {
    let description = err.to_string();
    if err.is_permanent() {
        // 535 is the standard authentication failure reply
        if err.status().is_some_and(|code| code.to_string() == "535") {
            TransportError::Authentication(description)
        } else {
            TransportError::Rejected(description)
        }
    } else if err.is_transient() || err.is_response() {
        TransportError::Other(description)
    } else if err.is_client() {
        TransportError::InvalidMessage(description)
    } else {
        TransportError::Connection(description)
    }
}

fn mailbox(field: &str, recipient: &Recipient) -> Result<Mailbox, TransportError> {
    let address: Address = recipient.address().parse().map_err(|e| {
        TransportError::InvalidMessage(format!(
            "Invalid {} address '{}': {}",
            field,
            recipient.address(),
            e
        ))
    })?;
    Ok(Mailbox::new(recipient.name().map(str::to_string), address))
}

fn content_type(declared: Option<&str>) -> Result<ContentType, TransportError> {
    match declared {
        None => Ok(ContentType::TEXT_PLAIN),
        Some(raw) => ContentType::parse(raw).map_err(|e| {
            TransportError::InvalidMessage(format!("Invalid content type '{}': {}", raw, e))
        }),
    }
}

fn single_part(part: &MimePart) -> Result<SinglePart, TransportError> {
    Ok(SinglePart::builder()
        .header(content_type(part.content_type.as_deref())?)
        .body(part.content.clone()))
}

fn message_id(id: &str) -> String {
    let id = id.trim();
    if id.starts_with('<') && id.ends_with('>') {
        id.to_string()
    } else {
        format!("<{}>", id)
    }
}

/// Accepts a unix timestamp, RFC 2822 or RFC 3339.
fn parse_date(raw: &str) -> Result<SystemTime, TransportError> {
    let raw = raw.trim();
    let invalid = || TransportError::InvalidMessage(format!("Invalid date '{}'", raw));

    if let Ok(seconds) = raw.parse::<i64>() {
        return DateTime::<Utc>::from_timestamp(seconds, 0)
            .map(SystemTime::from)
            .ok_or_else(invalid);
    }

    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(SystemTime::from)
        .map_err(|_| invalid())
}

#[derive(Debug, Clone, PartialEq)]
struct XPriority(Priority);

impl Header for XPriority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Priority")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let value: i64 = s.split_whitespace().next().unwrap_or_default().parse()?;
        Ok(Self(Priority::from(value)))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ReturnPath(String);

impl Header for ReturnPath {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Return-Path")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Ok(Self(s.trim_matches(|c| c == '<' || c == '>').to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), format!("<{}>", self.0))
    }
}

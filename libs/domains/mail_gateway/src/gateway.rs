//! The notification gateway.

use crate::config::GatewayConfig;
use crate::error::{ConfigurationError, TransportError, ValidationError};
use crate::html::HtmlToText;
use crate::input::{MessageFields, MessageInput, RecipientInput};
use crate::models::{Body, EmailSpec, Recipient};
use crate::normalizer::Normalizer;
use crate::response::Response;
use crate::transport::{MailTransport, OutboundMessage, SmtpTransport};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

const HTML: &str = "text/html";
const PLAIN: &str = "text/plain";

/// Normalizes caller input, hands it to a transport, and reports the
/// outcome as a [`Response`].
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn MailTransport>,
    normalizer: Arc<Normalizer>,
}

/// Builder for [`Gateway`] with optional defaults and converter.
pub struct GatewayBuilder {
    transport: Arc<dyn MailTransport>,
    normalizer: Normalizer,
}

impl GatewayBuilder {
    /// Message fields applied to every call that leaves them unset.
    pub fn defaults(mut self, defaults: MessageFields) -> Self {
        self.normalizer = self.normalizer.with_defaults(defaults);
        self
    }

    /// Replace the default HTML-to-text converter.
    pub fn converter(mut self, converter: impl HtmlToText + 'static) -> Self {
        self.normalizer = self.normalizer.with_converter(Arc::new(converter));
        self
    }

    pub fn build(self) -> Gateway {
        Gateway {
            transport: self.transport,
            normalizer: Arc::new(self.normalizer),
        }
    }
}

impl Gateway {
    /// Create a gateway with no default fields.
    pub fn new(transport: impl MailTransport + 'static, sender: impl Into<Recipient>) -> Self {
        Self::builder(transport, sender).build()
    }

    pub fn builder(
        transport: impl MailTransport + 'static,
        sender: impl Into<Recipient>,
    ) -> GatewayBuilder {
        GatewayBuilder {
            transport: Arc::new(transport),
            normalizer: Normalizer::new(sender),
        }
    }

    /// Create an SMTP-backed gateway.
    pub fn from_config(config: GatewayConfig) -> Result<Self, ConfigurationError> {
        let transport = SmtpTransport::new(&config)?;

        info!(
            host = %config.host,
            port = %config.port,
            encryption = %config.encryption,
            from = %config.from,
            "Mail gateway configured"
        );

        Ok(Self::builder(transport, config.from)
            .defaults(config.defaults)
            .build())
    }

    /// Default sender used when neither the call nor the defaults name one.
    pub fn sender(&self) -> &Recipient {
        self.normalizer.sender()
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Normalize without sending.
    pub fn prepare(
        &self,
        to: impl Into<RecipientInput>,
        message: impl Into<MessageInput>,
    ) -> Result<EmailSpec, ValidationError> {
        self.normalizer.normalize(to.into(), message.into())
    }

    /// Send one notification.
    ///
    /// Only invalid input is an `Err`; every transport outcome, failures
    /// included, comes back as a [`Response`].
    #[instrument(skip_all, fields(transport = self.transport.name()))]
    pub async fn notify(
        &self,
        to: impl Into<RecipientInput>,
        message: impl Into<MessageInput>,
    ) -> Result<Response, ValidationError> {
        let spec = self.prepare(to, message)?;
        Ok(self.send(spec).await)
    }

    /// [`notify`](Self::notify) for loosely typed JSON input.
    pub async fn notify_json(&self, to: Value, message: Value) -> Result<Response, ValidationError> {
        let to = RecipientInput::try_from(to)?;
        let message = MessageInput::try_from(message)?;
        self.notify(to, message).await
    }

    /// Send an already normalized [`EmailSpec`].
    pub async fn send(&self, spec: EmailSpec) -> Response {
        let to = spec.to().address().to_string();
        let outbound: OutboundMessage = spec.into();

        let outcome = self.transport.send(&outbound).await;
        match &outcome {
            Ok(delivery) if delivery.is_complete() => {
                info!(to = %to, accepted = delivery.accepted, "Notification sent");
            }
            Ok(delivery) => {
                warn!(
                    to = %to,
                    accepted = delivery.accepted,
                    rejected = ?delivery.rejected,
                    "Notification not delivered to every recipient"
                );
            }
            Err(e) => {
                error!(to = %to, kind = e.kind(), error = %e, "Failed to send notification");
            }
        }

        Response::from_outcome(outcome)
    }

    /// Check that the transport can reach its server. Sends nothing.
    pub async fn health_check(&self) -> Result<(), TransportError> {
        self.transport.health_check().await
    }
}

impl From<EmailSpec> for OutboundMessage {
    fn from(spec: EmailSpec) -> Self {
        // Exhaustive so a new EmailSpec field fails to compile until mapped
        let EmailSpec {
            to,
            cc,
            bcc,
            from,
            reply_to,
            return_path,
            id,
            date,
            priority,
            subject,
            body,
            content_type,
        } = spec;

        let mut message = OutboundMessage::new();
        message.set_to(to).set_from(from).set_subject(subject);

        if let Some(cc) = cc {
            message.set_cc(cc);
        }
        if let Some(bcc) = bcc {
            message.set_bcc(bcc);
        }
        if let Some(reply_to) = reply_to {
            message.set_reply_to(reply_to);
        }
        if let Some(return_path) = return_path {
            message.set_return_path(return_path);
        }
        if let Some(id) = id {
            message.set_id(id);
        }
        if let Some(date) = date {
            message.set_date(date);
        }
        if let Some(priority) = priority {
            message.set_priority(priority);
        }
        if let Some(content_type) = content_type {
            message.set_content_type(content_type);
        }

        match body {
            Body::Plain(text) => {
                message.set_body(text, None);
            }
            Body::Html(html) => {
                message.set_body(html, Some(HTML));
            }
            Body::Both { html, plain } => {
                message.set_body(html, Some(HTML)).add_part(plain, PLAIN);
            }
        }

        message
    }
}

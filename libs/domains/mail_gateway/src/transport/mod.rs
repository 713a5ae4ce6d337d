//! Mail transport implementations.
//!
//! The gateway hands a transport an [`OutboundMessage`] and gets back a
//! [`Delivery`] report or a [`TransportError`].

pub mod mock;
pub mod smtp;

pub use mock::RecordingTransport;
pub use smtp::SmtpTransport;

use crate::error::TransportError;
use crate::models::{Priority, Recipient};
use async_trait::async_trait;

/// Outcome of a send the transport accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Number of recipients the transport accepted
    pub accepted: usize,
    /// Addresses the transport could not deliver to
    pub rejected: Vec<String>,
}

impl Delivery {
    /// Every recipient accepted.
    pub fn accepted(count: usize) -> Self {
        Self {
            accepted: count,
            rejected: Vec::new(),
        }
    }

    /// Some recipients rejected.
    pub fn partial(accepted: usize, rejected: Vec<String>) -> Self {
        Self { accepted, rejected }
    }

    pub fn is_complete(&self) -> bool {
        self.accepted > 0 && self.rejected.is_empty()
    }
}

/// A body part with an optional MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimePart {
    pub content: String,
    pub content_type: Option<String>,
}

/// Transport-level message, assembled setter by setter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundMessage {
    to: Option<Recipient>,
    cc: Option<Recipient>,
    bcc: Option<Recipient>,
    from: Option<Recipient>,
    reply_to: Option<String>,
    return_path: Option<String>,
    id: Option<String>,
    date: Option<String>,
    priority: Option<Priority>,
    subject: Option<String>,
    content_type: Option<String>,
    body: Option<MimePart>,
    parts: Vec<MimePart>,
}

impl OutboundMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_to(&mut self, to: Recipient) -> &mut Self {
        self.to = Some(to);
        self
    }

    pub fn set_cc(&mut self, cc: Recipient) -> &mut Self {
        self.cc = Some(cc);
        self
    }

    pub fn set_bcc(&mut self, bcc: Recipient) -> &mut Self {
        self.bcc = Some(bcc);
        self
    }

    pub fn set_from(&mut self, from: Recipient) -> &mut Self {
        self.from = Some(from);
        self
    }

    pub fn set_reply_to(&mut self, reply_to: String) -> &mut Self {
        self.reply_to = Some(reply_to);
        self
    }

    pub fn set_return_path(&mut self, return_path: String) -> &mut Self {
        self.return_path = Some(return_path);
        self
    }

    pub fn set_id(&mut self, id: String) -> &mut Self {
        self.id = Some(id);
        self
    }

    pub fn set_date(&mut self, date: String) -> &mut Self {
        self.date = Some(date);
        self
    }

    pub fn set_priority(&mut self, priority: Priority) -> &mut Self {
        self.priority = Some(priority);
        self
    }

    pub fn set_subject(&mut self, subject: String) -> &mut Self {
        self.subject = Some(subject);
        self
    }

    pub fn set_content_type(&mut self, content_type: String) -> &mut Self {
        self.content_type = Some(content_type);
        self
    }

    /// Set the primary content. Replaces any previous primary content.
    pub fn set_body(&mut self, content: String, content_type: Option<&str>) -> &mut Self {
        self.body = Some(MimePart {
            content,
            content_type: content_type.map(str::to_string),
        });
        self
    }

    /// Add an alternative rendition of the primary content.
    pub fn add_part(&mut self, content: String, content_type: &str) -> &mut Self {
        self.parts.push(MimePart {
            content,
            content_type: Some(content_type.to_string()),
        });
        self
    }

    pub fn to(&self) -> Option<&Recipient> {
        self.to.as_ref()
    }

    pub fn cc(&self) -> Option<&Recipient> {
        self.cc.as_ref()
    }

    pub fn bcc(&self) -> Option<&Recipient> {
        self.bcc.as_ref()
    }

    pub fn from(&self) -> Option<&Recipient> {
        self.from.as_ref()
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    pub fn return_path(&self) -> Option<&str> {
        self.return_path.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> Option<&MimePart> {
        self.body.as_ref()
    }

    pub fn parts(&self) -> &[MimePart] {
        &self.parts
    }

    /// `to`, `cc` and `bcc`, in that order, skipping unset ones.
    pub fn recipients(&self) -> impl Iterator<Item = &Recipient> {
        [&self.to, &self.cc, &self.bcc]
            .into_iter()
            .filter_map(Option::as_ref)
    }
}

/// Trait for mail transports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send one message. Partial failures are reported in the returned
    /// [`Delivery`]; hard failures as `Err`.
    async fn send(&self, message: &OutboundMessage) -> Result<Delivery, TransportError>;

    /// Check that the transport can reach its server
    async fn health_check(&self) -> Result<(), TransportError>;

    /// Get transport name
    fn name(&self) -> &'static str;
}

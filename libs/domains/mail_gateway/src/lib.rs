//! Mail Gateway
//!
//! Turns a loosely structured notification (a recipient and a message)
//! into a fully specified email, sends it through a mail transport, and
//! reports the outcome as a uniform [`Response`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │     Caller      │  ← notify(to, message)
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │   Normalizer    │  ← defaults, subject, HTML/plain parts
//! └────────┬────────┘
//!          │ EmailSpec
//! ┌────────▼────────┐
//! │     Gateway     │  ← EmailSpec → OutboundMessage, outcome → Response
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │  MailTransport  │  ← SMTP (lettre) or in-memory
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use mail_gateway::{Gateway, GatewayConfig, MessageFields, RecipientInput};
//!
//! let gateway = Gateway::from_config(GatewayConfig::from_env()?)?;
//!
//! // Bare message: the subject is derived from the text
//! let response = gateway.notify("ops@example.com", "Disk almost full").await?;
//!
//! // Structured message with a carbon copy
//! let response = gateway
//!     .notify(
//!         RecipientInput::from("ops@example.com").with_cc("lead@example.com"),
//!         MessageFields::new().with_subject("Deploy").with_body("<p>Done</p>"),
//!     )
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod html;
pub mod input;
pub mod models;
pub mod normalizer;
pub mod response;
pub mod transport;

pub use config::{Encryption, GatewayConfig};
pub use error::{ConfigurationError, TransportError, ValidationError};
pub use gateway::{Gateway, GatewayBuilder};
pub use html::{HtmdConverter, HtmlToText};
pub use input::{BodyInput, MessageFields, MessageInput, RecipientInput};
pub use models::{Body, EmailSpec, Priority, Recipient};
pub use normalizer::Normalizer;
pub use response::{RawOutcome, Response};
pub use transport::{Delivery, MailTransport, OutboundMessage, RecordingTransport, SmtpTransport};

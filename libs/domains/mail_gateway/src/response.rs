//! Uniform result of a send attempt.

use crate::error::TransportError;
use crate::transport::Delivery;
use serde::Serialize;

pub const SENT_MESSAGE: &str = "Message sent";
pub const FAILED_RECIPIENTS_PREFIX: &str = "Failed to send emails for the following recipients: ";
pub const NOTHING_ACCEPTED_MESSAGE: &str = "No recipients were accepted by the transport";

/// What the transport itself reported, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum RawOutcome {
    /// Number of recipients accepted
    Delivered(usize),
    /// Addresses the transport refused
    Rejected(Vec<String>),
}

/// Result of one send attempt. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<RawOutcome>,
}

impl Response {
    /// Map a transport outcome.
    pub fn from_outcome(outcome: Result<Delivery, TransportError>) -> Self {
        match outcome {
            Ok(delivery) if !delivery.rejected.is_empty() => Self {
                success: false,
                message: format!(
                    "{}{}",
                    FAILED_RECIPIENTS_PREFIX,
                    delivery.rejected.join(", ")
                ),
                raw: Some(RawOutcome::Rejected(delivery.rejected)),
            },
            Ok(delivery) if delivery.accepted == 0 => Self {
                success: false,
                message: NOTHING_ACCEPTED_MESSAGE.to_string(),
                raw: Some(RawOutcome::Delivered(0)),
            },
            Ok(delivery) => Self {
                success: true,
                message: SENT_MESSAGE.to_string(),
                raw: Some(RawOutcome::Delivered(delivery.accepted)),
            },
            Err(err) => Self {
                success: false,
                message: err.to_string(),
                raw: None,
            },
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn raw(&self) -> Option<&RawOutcome> {
        self.raw.as_ref()
    }

    /// Addresses the transport refused, if any.
    pub fn rejected(&self) -> &[String] {
        match &self.raw {
            Some(RawOutcome::Rejected(addresses)) => addresses,
            _ => &[],
        }
    }
}

impl From<Result<Delivery, TransportError>> for Response {
    fn from(outcome: Result<Delivery, TransportError>) -> Self {
        Self::from_outcome(outcome)
    }
}

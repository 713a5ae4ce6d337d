//! In-memory transport for tests and dry runs

use super::{Delivery, MailTransport, OutboundMessage};
use crate::error::TransportError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Transport that records every message instead of delivering it.
///
/// Clones share the same record.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    messages: Arc<Mutex<Vec<OutboundMessage>>>,
    failure: Option<TransportError>,
    rejected: Vec<String>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport whose sends and health checks all fail with `error`
    pub fn failing(error: TransportError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Create a transport that refuses the given addresses and accepts the rest
    pub fn rejecting<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rejected: addresses.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Get all recorded messages
    pub async fn messages(&self) -> Vec<OutboundMessage> {
        self.messages.lock().await.clone()
    }

    pub async fn send_count(&self) -> usize {
        self.messages.lock().await.len()
    }

    /// Check if any recorded message went to `address` as to, cc or bcc
    pub async fn was_sent_to(&self, address: &str) -> bool {
        self.messages
            .lock()
            .await
            .iter()
            .any(|m| m.recipients().any(|r| r.address() == address))
    }

    pub async fn clear(&self) {
        self.messages.lock().await.clear();
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<Delivery, TransportError> {
        self.messages.lock().await.push(message.clone());

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let (refused, accepted): (Vec<&str>, Vec<&str>) = message
            .recipients()
            .map(|r| r.address())
            .partition(|address| self.rejected.iter().any(|r| r == address));

        Ok(Delivery::partial(
            accepted.len(),
            refused.into_iter().map(str::to_string).collect(),
        ))
    }

    async fn health_check(&self) -> Result<(), TransportError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

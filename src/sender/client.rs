//! Chat client seam used by the dispatch workers.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::info;

use crate::error::{Error, Result};

/// Result of one delivery attempt, as seen by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    ResolutionFailed(String),
    DeliveryFailed(String),
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered)
    }
}

/// Connection, resolution and delivery, owned by the underlying library.
///
/// One client is shared by all workers of a cycle; implementations must
/// serialize concurrent calls themselves if the transport requires it.
#[async_trait]
pub trait ChatClient: Send + Sync {
    type Entity: Send + Sync;

    /// Establish the session for `phone`.
    async fn connect(&mut self, phone: &str) -> Result<()>;

    /// Resolve a normalized identifier into something messages can be sent to.
    async fn resolve(&self, identifier: &str) -> Result<Self::Entity>;

    async fn send(&self, entity: &Self::Entity, text: &str) -> Result<()>;

    /// Release the session. Safe to call more than once.
    async fn disconnect(&mut self);

    /// Resolve then send, folding errors into a [`SendOutcome`].
    async fn deliver(&self, identifier: &str, text: &str) -> SendOutcome {
        let entity = match self.resolve(identifier).await {
            Ok(entity) => entity,
            Err(e) => return SendOutcome::ResolutionFailed(e.to_string()),
        };
        match self.send(&entity, text).await {
            Ok(()) => SendOutcome::Delivered,
            Err(e) => SendOutcome::DeliveryFailed(e.to_string()),
        }
    }
}

/// Client that logs instead of talking to Telegram.
#[derive(Debug, Default)]
pub struct DryRunClient {
    connected: bool,
    sent: AtomicUsize,
}

impl DryRunClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages "sent" so far.
    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChatClient for DryRunClient {
    type Entity = String;

    async fn connect(&mut self, phone: &str) -> Result<()> {
        info!(%phone, "Dry run: not connecting to Telegram");
        self.connected = true;
        Ok(())
    }

    async fn resolve(&self, identifier: &str) -> Result<String> {
        if identifier.is_empty() {
            return Err(Error::ResolutionFailed {
                target: identifier.to_string(),
                reason: "empty identifier".to_string(),
            });
        }
        Ok(identifier.to_string())
    }

    async fn send(&self, entity: &String, text: &str) -> Result<()> {
        if !self.connected {
            return Err(Error::ConnectionError("dry run client not connected".into()));
        }
        self.sent.fetch_add(1, Ordering::Relaxed);
        info!(target_chat = %entity, chars = text.chars().count(), "Dry run: message not sent");
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.connected = false;
    }
}

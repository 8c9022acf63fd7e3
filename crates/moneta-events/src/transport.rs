//! Event transport contract and the in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::sync::broadcast;

use moneta_core::result::AppResult;

/// The send side of the message broker.
///
/// The broker itself is external; this is the only contract it must
/// satisfy. Implementations publish a JSON document to a named logical
/// channel and may fail — the dispatcher contains those failures.
#[async_trait]
pub trait EventTransport: Send + Sync + 'static {
    /// Publish a JSON document to a channel.
    async fn publish(&self, channel: &str, payload: serde_json::Value) -> AppResult<()>;
}

/// In-memory pub/sub transport for single-node deployments and tests.
#[derive(Debug)]
pub struct MemoryTransport {
    /// Channel name → broadcast sender
    channels: RwLock<HashMap<String, broadcast::Sender<serde_json::Value>>>,
    /// Buffer size for channels
    buffer_size: usize,
}

impl MemoryTransport {
    /// Create a new in-memory transport.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            buffer_size,
        }
    }

    /// Subscribe to a channel, returns a receiver. This is the consume
    /// side used by downstream notification/audit consumers.
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<serde_json::Value> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);
        tx.subscribe()
    }
}

#[async_trait]
impl EventTransport for MemoryTransport {
    async fn publish(&self, channel: &str, payload: serde_json::Value) -> AppResult<()> {
        let channels = self.channels.read().await;
        if let Some(tx) = channels.get(channel) {
            // A send error only means no live subscribers; pub/sub drops it.
            let _ = tx.send(payload);
        }
        Ok(())
    }
}

//! Change notifications shared between the draft store, publisher and views

use crate::catalog::CatalogRecord;
use tokio::sync::broadcast;

/// Something changed that may invalidate the merged catalog
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// The draft collection stored under `key` was rewritten
    StorageChanged { key: String },

    /// A draft was published to the remote store
    DraftPublished(Box<CatalogRecord>),

    /// The remote catalog file was rewritten
    CatalogChanged,
}

/// Broadcast hub for [`Signal`]s
///
/// Subscribers treat every signal as "re-run the merge"; none of them carries
/// state to apply directly.
#[derive(Debug, Clone)]
pub struct EventHub {
    tx: broadcast::Sender<Signal>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to future signals
    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.tx.subscribe()
    }

    /// Broadcast a signal
    pub fn broadcast(&self, signal: Signal) {
        // Ignore errors (no subscribers)
        let _ = self.tx.send(signal);
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_signals() {
        let hub = EventHub::default();
        let mut rx = hub.subscribe();

        hub.broadcast(Signal::CatalogChanged);
        assert_eq!(rx.recv().await.unwrap(), Signal::CatalogChanged);
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        EventHub::new(4).broadcast(Signal::StorageChanged {
            key: "localBooks_v1".to_string(),
        });
    }
}

//! Store-opened notifications
//!
//! The host announces every record store it opens. Listeners (schema
//! preloading, for one) subscribe to receive the store keys.

use tokio::sync::broadcast;

use crate::store::StoreKey;

/// Default number of buffered notifications per subscriber
const DEFAULT_CAPACITY: usize = 64;

/// Broadcast source of opened store keys
#[derive(Debug, Clone)]
pub struct StoreOpenedEvents {
    sender: broadcast::Sender<StoreKey>,
}

impl StoreOpenedEvents {
    /// Create a notification source with the default buffer size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a notification source buffering `capacity` events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Announce an opened store. Returns the number of listeners notified.
    pub fn notify(&self, key: StoreKey) -> usize {
        match self.sender.send(key) {
            Ok(count) => count,
            Err(broadcast::error::SendError(key)) => {
                tracing::debug!(store = %key, "Store opened with no listeners");
                0
            }
        }
    }

    /// Subscribe to future notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreKey> {
        self.sender.subscribe()
    }

    /// Number of active listeners.
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for StoreOpenedEvents {
    fn default() -> Self {
        Self::new()
    }
}

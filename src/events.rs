use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the broadcast channel backing [`EventSender`]. Store events
/// are small and consumers are UI-speed, so a shallow buffer is enough.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Notifications emitted by the stores after state changes.
///
/// This is the explicit subscription mechanism between stores and views:
/// a view subscribes and re-reads a store snapshot when an event arrives,
/// instead of being pushed state directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StoreEvent {
    // Cart events
    CartRefreshed { item_count: u32, total: Decimal },
    CartItemAdded { product_id: i64 },
    CartItemUpdated { item_id: i64 },
    CartItemRemoved { item_id: i64 },
    CartCleared,

    // Address book events
    AddressAdded,
    AddressUpdated { address_id: i64 },
    AddressDeleted { address_id: i64 },

    // Order / payment events
    OrderPlaced { order_id: i64 },
    OrderConfirmed { order_id: i64 },
    PaymentFailed { order_id: i64, reason: String },
}

/// Multi-subscriber event fan-out for store notifications.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventSender {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Opens a new subscription. Each subscriber sees every event sent
    /// after it subscribed.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Sends an event, logging instead of failing when nobody listens.
    /// A store mutation must never fail because no view is mounted.
    pub fn send_or_log(&self, event: StoreEvent) {
        if let Err(err) = self.sender.send(event) {
            debug!("No event subscribers: {}", err);
        }
    }
}

impl Default for EventSender {
    fn default() -> Self {
        Self::new()
    }
}

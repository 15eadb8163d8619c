use crate::{
    errors::ClientError,
    events::{EventSender, StoreEvent},
    models::cart::{CartCountEnvelope, CartEnvelope, CartItem, CartTotals},
    stores::{ConfirmationPrompt, StatusMessage},
    transport::ApiClient,
};
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};
use tracing::{info, instrument, warn};

/// Snapshot of the cart store's state.
///
/// Totals are always derived from `items` via [`CartTotals::from_items`];
/// there is no path that writes them from a server aggregate.
#[derive(Debug, Clone)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
    pub loading: bool,
    /// The single line currently being mutated, for UI disabling. One slot,
    /// not a set: overlapping edits show only the most recent as updating,
    /// though each request proceeds independently.
    pub updating_item_id: Option<i64>,
    pub message: Option<StatusMessage>,
}

impl CartState {
    fn initial() -> Self {
        Self {
            items: Vec::new(),
            totals: CartTotals::empty(),
            loading: true,
            updating_item_id: None,
            message: None,
        }
    }

    /// State after discovering there is no session: an empty cart, not an
    /// error.
    fn signed_out() -> Self {
        Self {
            loading: false,
            ..Self::initial()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cart state store: item list, derived totals, quantity mutation,
/// refresh-after-write.
///
/// Mutations never update totals optimistically: every write is followed
/// by a [`CartStore::refresh`] that re-reads the authoritative item list.
/// Operations catch their own errors and surface them as the store's
/// banner message; nothing is retried automatically.
pub struct CartStore {
    api: Arc<ApiClient>,
    events: EventSender,
    prompt: Arc<dyn ConfirmationPrompt>,
    state: RwLock<CartState>,
}

impl CartStore {
    pub fn new(
        api: Arc<ApiClient>,
        events: EventSender,
        prompt: Arc<dyn ConfirmationPrompt>,
    ) -> Self {
        Self {
            api,
            events,
            prompt,
            state: RwLock::new(CartState::initial()),
        }
    }

    /// Current state, cloned. Views re-read this when a [`StoreEvent`]
    /// arrives.
    pub fn snapshot(&self) -> CartState {
        self.state.read().expect("cart state lock poisoned").clone()
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn dismiss_message(&self) {
        self.with_state(|state| state.message = None);
    }

    /// Re-fetches the authoritative cart and recomputes all derived totals
    /// from the returned item list.
    ///
    /// A 401 resets the store to an empty signed-out cart instead of
    /// surfacing an error; any other failure becomes the banner message.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        self.with_state(|state| state.loading = true);

        match self.api.get::<CartEnvelope>("/api/cart").await {
            Ok(envelope) if envelope.success => {
                let totals = CartTotals::from_items(&envelope.items);
                let (item_count, total) = (totals.item_count, totals.total);
                self.with_state(|state| {
                    state.items = envelope.items;
                    state.totals = totals;
                    state.loading = false;
                });
                self.events
                    .send_or_log(StoreEvent::CartRefreshed { item_count, total });
            }
            Ok(_) => {
                self.with_state(|state| state.loading = false);
            }
            Err(ClientError::Unauthorized) => {
                self.with_state(|state| *state = CartState::signed_out());
            }
            Err(err) => self.record_error(err),
        }
    }

    /// Adds a product line (the server increments quantity when the
    /// product is already in the cart), then re-syncs. No optimistic
    /// update happens before the round trip.
    #[instrument(skip(self))]
    pub async fn add_item(&self, product_id: i64, quantity: u32) {
        let body = json!({ "productId": product_id, "quantity": quantity });
        match self.api.post::<Value>("/api/cart/items", body).await {
            Ok(_) => {
                info!("Added product {} x{} to cart", product_id, quantity);
                self.events
                    .send_or_log(StoreEvent::CartItemAdded { product_id });
                self.refresh().await;
            }
            Err(err) => self.record_error(err),
        }
    }

    /// Sets the quantity of a cart line. A quantity of zero is rejected
    /// locally with no network call; removal is a distinct explicit action.
    #[instrument(skip(self))]
    pub async fn update_item(&self, item_id: i64, quantity: u32) {
        if quantity < 1 {
            self.with_state(|state| {
                state.message = Some(StatusMessage::error("Quantity must be at least 1"));
            });
            return;
        }

        self.with_state(|state| state.updating_item_id = Some(item_id));

        let result = self
            .api
            .put::<Value>(
                &format!("/api/cart/items/{}", item_id),
                json!({ "quantity": quantity }),
            )
            .await;

        match result {
            Ok(_) => {
                self.events
                    .send_or_log(StoreEvent::CartItemUpdated { item_id });
                self.refresh().await;
            }
            Err(err) => self.record_error(err),
        }

        self.with_state(|state| state.updating_item_id = None);
    }

    /// Removes a cart line after explicit confirmation. Declining the
    /// prompt issues no request.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, item_id: i64) {
        if !self.prompt.confirm("Remove this item from cart?") {
            return;
        }

        self.with_state(|state| state.updating_item_id = Some(item_id));

        match self
            .api
            .delete::<Value>(&format!("/api/cart/items/{}", item_id))
            .await
        {
            Ok(_) => {
                info!("Removed cart item {}", item_id);
                self.events
                    .send_or_log(StoreEvent::CartItemRemoved { item_id });
                self.refresh().await;
            }
            Err(err) => self.record_error(err),
        }

        self.with_state(|state| state.updating_item_id = None);
    }

    /// Empties the cart after explicit confirmation.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) {
        if !self.prompt.confirm("Clear all items from your cart?") {
            return;
        }

        match self.api.delete::<Value>("/api/cart").await {
            Ok(_) => {
                info!("Cleared cart");
                self.events.send_or_log(StoreEvent::CartCleared);
                self.refresh().await;
            }
            Err(err) => self.record_error(err),
        }
    }

    /// Item count for the nav badge. Failures are logged and reported as
    /// absent rather than raising a banner; the badge is not worth one.
    pub async fn badge_count(&self) -> Option<u32> {
        match self.api.get::<CartCountEnvelope>("/api/cart/count").await {
            Ok(envelope) => Some(envelope.count),
            Err(err) => {
                warn!("Failed to fetch cart badge count: {}", err);
                None
            }
        }
    }

    fn record_error(&self, err: ClientError) {
        warn!("Cart operation failed: {}", err);
        let message = StatusMessage::error(err.user_message());
        self.with_state(|state| {
            state.loading = false;
            state.message = Some(message);
        });
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut CartState) -> R) -> R {
        let mut state = self.state.write().expect("cart state lock poisoned");
        f(&mut state)
    }
}

use crate::{
    errors::ClientError,
    events::{EventSender, StoreEvent},
    gateway::{PaymentFlow, PaymentGateway, PaymentPrefill},
    models::{
        address::{Address, AddressInput, AddressListEnvelope},
        order::{CheckoutReceipt, Order, PaymentMethod},
    },
    stores::{cart::CartStore, ConfirmationPrompt, StatusMessage},
    transport::ApiClient,
};
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};
use tracing::{info, instrument, warn};
use validator::Validate;

/// The three checkout steps, in order. Forward movement is guarded;
/// moving back never loses data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStep {
    Address,
    Payment,
    Review,
}

impl CheckoutStep {
    pub fn number(self) -> u8 {
        match self {
            Self::Address => 1,
            Self::Payment => 2,
            Self::Review => 3,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Address => Self::Payment,
            Self::Payment | Self::Review => Self::Review,
        }
    }

    fn back(self) -> Self {
        match self {
            Self::Address | Self::Payment => Self::Address,
            Self::Review => Self::Payment,
        }
    }
}

/// Snapshot of the checkout store's state.
#[derive(Debug, Clone)]
pub struct CheckoutState {
    pub step: CheckoutStep,
    pub addresses: Vec<Address>,
    pub selected_address_id: Option<i64>,
    /// Always holds a concrete choice (initially cash on delivery), so the
    /// step-2 guard is satisfied by construction.
    pub payment_method: PaymentMethod,
    pub loading: bool,
    pub message: Option<StatusMessage>,
    /// Set as soon as order creation succeeds; survives payment failures
    /// so the payment step can be retried against the same order.
    pub order_id: Option<i64>,
    /// Set only once checkout fully completes (COD order created, or
    /// online payment verified). The view navigates to the confirmation
    /// page for this order.
    pub confirmed_order_id: Option<i64>,
}

impl CheckoutState {
    fn initial() -> Self {
        Self {
            step: CheckoutStep::Address,
            addresses: Vec::new(),
            selected_address_id: None,
            payment_method: PaymentMethod::CashOnDelivery,
            loading: false,
            message: None,
            order_id: None,
            confirmed_order_id: None,
        }
    }

    pub fn selected_address(&self) -> Option<&Address> {
        let selected = self.selected_address_id?;
        self.addresses.iter().find(|a| a.address_id == selected)
    }
}

/// Checkout state store: address book, payment method, the three-step
/// flow, order submission, and the payment-gateway handoff.
pub struct CheckoutStore {
    api: Arc<ApiClient>,
    events: EventSender,
    cart: Arc<CartStore>,
    payment_flow: PaymentFlow,
    prompt: Arc<dyn ConfirmationPrompt>,
    state: RwLock<CheckoutState>,
}

impl CheckoutStore {
    pub fn new(
        api: Arc<ApiClient>,
        events: EventSender,
        cart: Arc<CartStore>,
        gateway: Arc<dyn PaymentGateway>,
        prompt: Arc<dyn ConfirmationPrompt>,
    ) -> Self {
        Self {
            payment_flow: PaymentFlow::new(Arc::clone(&api), gateway),
            api,
            events,
            cart,
            prompt,
            state: RwLock::new(CheckoutState::initial()),
        }
    }

    pub fn snapshot(&self) -> CheckoutState {
        self.state
            .read()
            .expect("checkout state lock poisoned")
            .clone()
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn dismiss_message(&self) {
        self.with_state(|state| state.message = None);
    }

    // ---- step machine ----

    /// Advances one step if the current step's guard passes.
    pub fn advance(&self) {
        self.with_state(|state| match state.step {
            CheckoutStep::Address if state.selected_address_id.is_none() => {
                state.message = Some(StatusMessage::error("Please select a delivery address"));
            }
            // The payment method always holds a value, so step 2 has no
            // runtime guard left to fail.
            _ => state.step = state.step.next(),
        });
    }

    /// Moves back one step. Nothing entered so far is discarded.
    pub fn back(&self) {
        self.with_state(|state| state.step = state.step.back());
    }

    pub fn set_payment_method(&self, method: PaymentMethod) {
        self.with_state(|state| state.payment_method = method);
    }

    /// Selects a saved address by id; unknown ids are ignored.
    pub fn select_address(&self, address_id: i64) {
        self.with_state(|state| {
            if state.addresses.iter().any(|a| a.address_id == address_id) {
                state.selected_address_id = Some(address_id);
            }
        });
    }

    // ---- address book ----

    /// Loads saved addresses. When nothing is selected yet, auto-selects
    /// the default address, falling back to the first.
    #[instrument(skip(self))]
    pub async fn fetch_addresses(&self) {
        match self
            .api
            .get::<AddressListEnvelope>("/api/user/addresses")
            .await
        {
            Ok(envelope) if envelope.success => {
                self.with_state(|state| {
                    state.addresses = envelope.addresses;

                    let selected_still_exists = state
                        .selected_address_id
                        .map(|id| state.addresses.iter().any(|a| a.address_id == id))
                        .unwrap_or(false);

                    if !selected_still_exists {
                        let fallback = state
                            .addresses
                            .iter()
                            .find(|a| a.is_default)
                            .or_else(|| state.addresses.first());
                        state.selected_address_id = fallback.map(|a| a.address_id);
                    }
                });
            }
            Ok(envelope) => {
                let text = envelope
                    .error
                    .unwrap_or_else(|| "Failed to load addresses".to_string());
                self.with_state(|state| state.message = Some(StatusMessage::error(text)));
            }
            Err(err) => self.record_error(err),
        }
    }

    /// Validates the form locally, then creates the address and re-fetches
    /// the list. A validation failure surfaces inline and sends nothing.
    #[instrument(skip(self, input))]
    pub async fn add_address(&self, input: AddressInput) {
        if let Err(errors) = input.validate() {
            self.with_state(|state| {
                state.message = Some(StatusMessage::error(
                    crate::errors::first_validation_message(&errors),
                ));
            });
            return;
        }

        self.with_state(|state| state.loading = true);

        let body = match serde_json::to_value(&input) {
            Ok(body) => body,
            Err(err) => {
                self.record_error(ClientError::Serialization(err));
                return;
            }
        };

        match self.api.post::<Value>("/api/user/addresses", body).await {
            Ok(response) => {
                let text = response
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Address added successfully")
                    .to_string();
                self.with_state(|state| {
                    state.loading = false;
                    state.message = Some(StatusMessage::success(text));
                });
                self.events.send_or_log(StoreEvent::AddressAdded);
                self.fetch_addresses().await;
            }
            Err(err) => self.record_error(err),
        }
    }

    /// Updates a saved address in place, with the same local validation as
    /// [`CheckoutStore::add_address`].
    #[instrument(skip(self, input))]
    pub async fn update_address(&self, address_id: i64, input: AddressInput) {
        if let Err(errors) = input.validate() {
            self.with_state(|state| {
                state.message = Some(StatusMessage::error(
                    crate::errors::first_validation_message(&errors),
                ));
            });
            return;
        }

        let body = match serde_json::to_value(&input) {
            Ok(body) => body,
            Err(err) => {
                self.record_error(ClientError::Serialization(err));
                return;
            }
        };

        match self
            .api
            .put::<Value>(&format!("/api/user/addresses/{}", address_id), body)
            .await
        {
            Ok(_) => {
                self.events
                    .send_or_log(StoreEvent::AddressUpdated { address_id });
                self.fetch_addresses().await;
            }
            Err(err) => self.record_error(err),
        }
    }

    /// Marks an address as the user's default. The server clears the flag
    /// on whichever address held it before.
    #[instrument(skip(self))]
    pub async fn set_default_address(&self, address_id: i64) {
        match self
            .api
            .put::<Value>(
                &format!("/api/user/addresses/{}/default", address_id),
                json!({}),
            )
            .await
        {
            Ok(_) => {
                self.events
                    .send_or_log(StoreEvent::AddressUpdated { address_id });
                self.fetch_addresses().await;
            }
            Err(err) => self.record_error(err),
        }
    }

    /// Deletes an address after explicit confirmation. If the deleted
    /// address was selected, selection falls back to the next available
    /// address, or to none only when no alternatives remain.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, address_id: i64) {
        if !self
            .prompt
            .confirm("Are you sure you want to delete this address?")
        {
            return;
        }

        match self
            .api
            .delete::<Value>(&format!("/api/user/addresses/{}", address_id))
            .await
        {
            Ok(response) => {
                let text = response
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Address deleted successfully")
                    .to_string();
                self.with_state(|state| state.message = Some(StatusMessage::success(text)));
                self.events
                    .send_or_log(StoreEvent::AddressDeleted { address_id });
                // fetch_addresses re-points the selection when the deleted
                // address was the selected one
                self.fetch_addresses().await;
            }
            Err(err) => self.record_error(err),
        }
    }

    // ---- order submission & payment ----

    /// Places the order for the selected address and payment method.
    ///
    /// Both guards run before any request: a missing address or an empty
    /// cart surfaces an error with no network call. Cash-on-delivery
    /// completes immediately; online payment continues into the gateway
    /// handoff. A created order is never lost: payment failures keep
    /// `order_id` so only the payment step is retried.
    #[instrument(skip(self))]
    pub async fn place_order(&self) {
        let (selected, method) = {
            let state = self.snapshot();
            (state.selected_address_id, state.payment_method)
        };

        let Some(address_id) = selected else {
            self.with_state(|state| {
                state.message = Some(StatusMessage::error("Please select a delivery address"));
            });
            return;
        };

        if self.cart.snapshot().is_empty() {
            self.with_state(|state| {
                state.message = Some(StatusMessage::error("Your cart is empty"));
            });
            return;
        }

        self.with_state(|state| state.loading = true);

        let receipt: CheckoutReceipt = match self
            .api
            .post(
                "/api/orders/checkout",
                json!({ "addressId": address_id, "paymentMethod": method.as_wire() }),
            )
            .await
        {
            Ok(receipt) => receipt,
            Err(err) => {
                self.record_error(err);
                return;
            }
        };

        let Some(order_id) = receipt.order_id else {
            let text = receipt
                .error
                .or(receipt.message)
                .unwrap_or_else(|| "Failed to place order".to_string());
            self.with_state(|state| {
                state.loading = false;
                state.message = Some(StatusMessage::error(text));
            });
            return;
        };

        info!("Order {} created ({})", order_id, method.as_wire());
        self.with_state(|state| state.order_id = Some(order_id));
        self.events.send_or_log(StoreEvent::OrderPlaced { order_id });

        match method {
            PaymentMethod::CashOnDelivery => {
                let text = receipt
                    .message
                    .unwrap_or_else(|| "Order placed successfully!".to_string());
                self.complete(order_id, text);
            }
            PaymentMethod::OnlineGateway => self.collect_payment(order_id).await,
        }
    }

    /// Re-runs the payment handoff for an order whose payment previously
    /// failed or was cancelled. User-initiated only.
    #[instrument(skip(self))]
    pub async fn retry_payment(&self) {
        let order_id = {
            let state = self.snapshot();
            if state.confirmed_order_id.is_some() {
                return;
            }
            state.order_id
        };

        let Some(order_id) = order_id else {
            self.with_state(|state| {
                state.message = Some(StatusMessage::error("No pending order to pay for"));
            });
            return;
        };

        self.with_state(|state| state.loading = true);
        self.collect_payment(order_id).await;
    }

    /// Fetches a placed order for the confirmation view.
    pub async fn fetch_order(&self, order_id: i64) -> Option<Order> {
        match self
            .api
            .get::<Order>(&format!("/api/orders/{}", order_id))
            .await
        {
            Ok(order) => Some(order),
            Err(err) => {
                self.record_error(err);
                None
            }
        }
    }

    async fn collect_payment(&self, order_id: i64) {
        let prefill = self
            .snapshot()
            .selected_address()
            .map(|address| PaymentPrefill {
                name: address.full_name.clone(),
                contact: address.phone.clone(),
            })
            .unwrap_or_default();

        match self.payment_flow.run(order_id, &prefill).await {
            Ok(outcome) => {
                let text = outcome
                    .message
                    .unwrap_or_else(|| "Payment verified successfully".to_string());
                self.complete(order_id, text);
            }
            Err(err) => {
                let reason = err.user_message();
                warn!("Payment for order {} failed: {}", order_id, reason);
                self.events.send_or_log(StoreEvent::PaymentFailed {
                    order_id,
                    reason: reason.clone(),
                });
                // The order survives on the server in an unpaid state;
                // order_id stays so retry_payment can pick it up.
                self.with_state(|state| {
                    state.loading = false;
                    state.message = Some(StatusMessage::error(reason));
                });
            }
        }
    }

    fn complete(&self, order_id: i64, text: String) {
        self.with_state(|state| {
            state.loading = false;
            state.confirmed_order_id = Some(order_id);
            state.message = Some(StatusMessage::success(text));
        });
        self.events
            .send_or_log(StoreEvent::OrderConfirmed { order_id });
    }

    fn record_error(&self, err: ClientError) {
        warn!("Checkout operation failed: {}", err);
        let message = StatusMessage::error(err.user_message());
        self.with_state(|state| {
            state.loading = false;
            state.message = Some(message);
        });
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut CheckoutState) -> R) -> R {
        let mut state = self.state.write().expect("checkout state lock poisoned");
        f(&mut state)
    }
}

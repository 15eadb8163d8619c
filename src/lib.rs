//! Headless storefront client.
//!
//! Typed state stores for a browser-storefront backend: cart contents with
//! derived totals, the three-step checkout flow, the saved-address book,
//! and the hosted payment-gateway handoff, all over REST/JSON with a
//! cookie-based session. There is no rendering here; a UI embeds the
//! stores, subscribes to [`events::StoreEvent`]s, and re-reads snapshots.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod stores;
pub mod transport;

use crate::{
    config::AppConfig,
    errors::ClientError,
    events::EventSender,
    gateway::PaymentGateway,
    stores::{CartStore, CheckoutStore, ConfirmationPrompt},
    transport::ApiClient,
};
use std::sync::Arc;

/// Wires the transport, event channel, and both stores together.
///
/// The gateway and confirmation prompt are the two seams a host UI must
/// provide; everything else is built from configuration.
pub struct Storefront {
    pub cart: Arc<CartStore>,
    pub checkout: Arc<CheckoutStore>,
    events: EventSender,
}

impl Storefront {
    pub fn new(
        config: &AppConfig,
        gateway: Arc<dyn PaymentGateway>,
        prompt: Arc<dyn ConfirmationPrompt>,
    ) -> Result<Self, ClientError> {
        let api = Arc::new(ApiClient::new(config)?);
        let events = EventSender::new();

        let cart = Arc::new(CartStore::new(
            Arc::clone(&api),
            events.clone(),
            Arc::clone(&prompt),
        ));
        let checkout = Arc::new(CheckoutStore::new(
            api,
            events.clone(),
            Arc::clone(&cart),
            gateway,
            prompt,
        ));

        Ok(Self {
            cart,
            checkout,
            events,
        })
    }

    /// Opens a subscription to every store's events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<events::StoreEvent> {
        self.events.subscribe()
    }
}

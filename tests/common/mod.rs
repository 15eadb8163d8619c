//! Shared harness for store integration tests: a wiremock backend, a
//! scripted payment gateway, and a recording confirmation prompt.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};
use storefront_client::{
    config::AppConfig,
    gateway::{GatewayError, PaymentGateway, PaymentPrefill},
    models::payment::{GatewayPayment, PaymentIntent},
    stores::ConfirmationPrompt,
    Storefront,
};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Confirmation prompt that records every question and answers with a
/// configurable yes/no.
pub struct StubPrompt {
    accept: AtomicBool,
    pub asked: Mutex<Vec<String>>,
}

impl StubPrompt {
    pub fn accepting() -> Self {
        Self {
            accept: AtomicBool::new(true),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    pub fn questions(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl ConfirmationPrompt for StubPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.asked.lock().unwrap().push(message.to_string());
        self.accept.load(Ordering::SeqCst)
    }
}

/// What the scripted gateway should do when asked to collect a payment.
#[derive(Debug, Clone)]
pub enum GatewayScript {
    Succeed,
    Dismiss,
    Fail(String),
    Unavailable,
}

/// Payment gateway double driven by a [`GatewayScript`], counting loads so
/// tests can assert the gateway was never touched on COD flows.
pub struct StubGateway {
    script: Mutex<GatewayScript>,
    pub loads: AtomicUsize,
    pub collections: AtomicUsize,
}

impl StubGateway {
    pub fn scripted(script: GatewayScript) -> Self {
        Self {
            script: Mutex::new(script),
            loads: AtomicUsize::new(0),
            collections: AtomicUsize::new(0),
        }
    }

    pub fn set_script(&self, script: GatewayScript) {
        *self.script.lock().unwrap() = script;
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn ensure_loaded(&self) -> Result<(), GatewayError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match *self.script.lock().unwrap() {
            GatewayScript::Unavailable => Err(GatewayError::Unavailable),
            _ => Ok(()),
        }
    }

    async fn collect(
        &self,
        intent: &PaymentIntent,
        _prefill: &PaymentPrefill,
    ) -> Result<GatewayPayment, GatewayError> {
        self.collections.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap().clone();
        match script {
            GatewayScript::Succeed => Ok(GatewayPayment {
                razorpay_order_id: intent.razorpay_order_id.clone(),
                razorpay_payment_id: format!("pay_{}", uuid::Uuid::new_v4().simple()),
                razorpay_signature: format!("sig_{}", uuid::Uuid::new_v4().simple()),
            }),
            GatewayScript::Dismiss => Err(GatewayError::Dismissed),
            GatewayScript::Fail(description) => Err(GatewayError::Failed(description)),
            GatewayScript::Unavailable => Err(GatewayError::Unavailable),
        }
    }
}

/// A storefront wired against a fresh mock backend.
pub struct TestApp {
    pub server: MockServer,
    pub front: Storefront,
    pub prompt: Arc<StubPrompt>,
    pub gateway: Arc<StubGateway>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_gateway(GatewayScript::Succeed).await
    }

    pub async fn with_gateway(script: GatewayScript) -> Self {
        let server = MockServer::start().await;
        let prompt = Arc::new(StubPrompt::accepting());
        let gateway = Arc::new(StubGateway::scripted(script));

        let config = AppConfig::for_base_url(server.uri());
        let front = Storefront::new(&config, gateway.clone(), prompt.clone())
            .expect("storefront builds against mock server");

        Self {
            server,
            front,
            prompt,
            gateway,
        }
    }

    /// Mounts `GET /api/cart` returning the given items.
    pub async fn mount_cart(&self, items: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/api/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "items": items,
            })))
            .mount(&self.server)
            .await;
    }

    /// Mounts `GET /api/user/addresses` returning the given addresses.
    pub async fn mount_addresses(&self, addresses: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/api/user/addresses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "addresses": addresses,
            })))
            .mount(&self.server)
            .await;
    }

    /// Mounts a mutation endpoint answering `{"success": true}`.
    pub async fn mount_ok(&self, http_method: &str, route: &str) {
        Mock::given(method(http_method))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&self.server)
            .await;
    }

    /// Requests the backend actually received, as `(method, path)` pairs.
    pub async fn received(&self) -> Vec<(String, String)> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|r| (r.method.to_string(), r.url.path().to_string()))
            .collect()
    }
}

pub fn cart_item(item_id: i64, name: &str, price: i64, quantity: u32) -> Value {
    json!({
        "cartItemId": item_id,
        "productId": item_id * 10,
        "productName": name,
        "productImage": format!("/images/{}.jpg", item_id),
        "category": "Apparel",
        "price": price,
        "quantity": quantity,
        "totalPrice": price * i64::from(quantity),
    })
}

pub fn address(address_id: i64, name: &str, is_default: bool) -> Value {
    json!({
        "addressId": address_id,
        "fullName": name,
        "phone": "9876543210",
        "addressLine": "12 MG Road",
        "city": "Bengaluru",
        "state": "Karnataka",
        "pinCode": "560001",
        "country": "India",
        "isDefault": is_default,
    })
}

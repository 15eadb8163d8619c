use super::address::Address;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the order will be paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Pay on delivery; checkout completes as soon as the order exists.
    #[serde(rename = "COD")]
    CashOnDelivery,
    /// Hosted gateway checkout; the order stays unpaid until the signed
    /// callback verifies.
    #[serde(rename = "RAZORPAY")]
    OnlineGateway,
}

impl PaymentMethod {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "COD",
            Self::OnlineGateway => "RAZORPAY",
        }
    }
}

/// Wire response of `POST /api/orders/checkout`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A line item inside a placed order (snapshot of the cart line at
/// purchase time).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_item_id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub total_price: Decimal,
}

/// A placed order as returned by `GET /api/orders/{id}`. The shipping
/// address is a snapshot taken at purchase time, not a live reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: i64,
    pub total_amount: Decimal,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub order_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

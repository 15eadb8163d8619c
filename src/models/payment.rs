use serde::{Deserialize, Serialize};

/// Payment-intent record returned by `POST /api/payments/create-order`.
///
/// `amount` is in the gateway's minor units (paise), distinct from the
/// decimal amounts everywhere else in the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub key_id: String,
    pub internal_order_id: i64,
    pub razorpay_order_id: String,
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// Signed response the hosted gateway hands back on a successful payment.
/// Forwarded verbatim to the verification endpoint; the client never
/// inspects the signature itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPayment {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Wire response of `POST /api/payments/verify`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOutcome {
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub order_id: Option<i64>,
}

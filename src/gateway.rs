use crate::{
    errors::ClientError,
    models::payment::{GatewayPayment, PaymentIntent, VerifyOutcome},
    transport::ApiClient,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Why a hosted-checkout attempt produced no signed payment.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The gateway itself could not be loaded or reached.
    #[error("payment gateway unavailable")]
    Unavailable,
    /// The user closed the hosted UI without paying.
    #[error("payment cancelled")]
    Dismissed,
    /// The gateway reported a failed payment attempt.
    #[error("{0}")]
    Failed(String),
}

/// Name and contact prefilled into the hosted checkout UI, taken from the
/// selected delivery address.
#[derive(Debug, Clone, Default)]
pub struct PaymentPrefill {
    pub name: String,
    pub contact: String,
}

/// The third-party hosted checkout collaborator.
///
/// Implementations wrap whatever surface actually collects the payment
/// (a webview, an embedded SDK, a test stub). The contract mirrors the
/// hosted script: loading is lazy and idempotent, and `collect` resolves
/// once the user finishes or abandons the hosted UI.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Prepares the gateway for use. Called before every collection;
    /// implementations must make repeat calls cheap.
    async fn ensure_loaded(&self) -> Result<(), GatewayError>;

    /// Opens the hosted UI for the given intent and resolves with the
    /// signed payment, or with why none was produced.
    async fn collect(
        &self,
        intent: &PaymentIntent,
        prefill: &PaymentPrefill,
    ) -> Result<GatewayPayment, GatewayError>;
}

/// Gateway placeholder for deployments that only accept cash on delivery.
/// Every collection attempt reports the gateway as unavailable.
#[derive(Debug, Default)]
pub struct NoGateway;

#[async_trait]
impl PaymentGateway for NoGateway {
    async fn ensure_loaded(&self) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn collect(
        &self,
        _intent: &PaymentIntent,
        _prefill: &PaymentPrefill,
    ) -> Result<GatewayPayment, GatewayError> {
        Err(GatewayError::Unavailable)
    }
}

/// Drives the full payment handoff for an already-created order:
/// intent creation, hosted collection, and server-side verification.
///
/// Every failure leaves the order in an unpaid state on the server and is
/// reported as [`ClientError::PaymentFailed`]; nothing here retries on its
/// own and nothing marks an order paid without a verified signature.
#[derive(Clone)]
pub struct PaymentFlow {
    api: Arc<ApiClient>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentFlow {
    pub fn new(api: Arc<ApiClient>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { api, gateway }
    }

    #[instrument(skip(self, prefill))]
    pub async fn run(
        &self,
        order_id: i64,
        prefill: &PaymentPrefill,
    ) -> Result<VerifyOutcome, ClientError> {
        if self.gateway.ensure_loaded().await.is_err() {
            return Err(ClientError::PaymentFailed(
                "Unable to load payment gateway. Please try again.".to_string(),
            ));
        }

        let intent: PaymentIntent = self
            .api
            .post("/api/payments/create-order", json!({ "orderId": order_id }))
            .await?;

        info!(
            "Opening gateway checkout for order {} ({} {} minor units)",
            intent.internal_order_id, intent.currency, intent.amount
        );

        let payment = match self.gateway.collect(&intent, prefill).await {
            Ok(payment) => payment,
            Err(GatewayError::Dismissed) => {
                return Err(ClientError::PaymentFailed(
                    "Payment cancelled. You can retry your payment.".to_string(),
                ));
            }
            Err(GatewayError::Failed(description)) => {
                return Err(ClientError::PaymentFailed(description));
            }
            Err(GatewayError::Unavailable) => {
                return Err(ClientError::PaymentFailed(
                    "Unable to load payment gateway. Please try again.".to_string(),
                ));
            }
        };

        let outcome: VerifyOutcome = self
            .api
            .post(
                "/api/payments/verify",
                json!({
                    "internalOrderId": intent.internal_order_id,
                    "razorpayOrderId": payment.razorpay_order_id,
                    "razorpayPaymentId": payment.razorpay_payment_id,
                    "razorpaySignature": payment.razorpay_signature,
                }),
            )
            .await?;

        if !outcome.verified {
            warn!("Payment verification failed for order {}", order_id);
            return Err(ClientError::PaymentFailed(
                outcome
                    .message
                    .unwrap_or_else(|| "Payment verification failed".to_string()),
            ));
        }

        info!("Payment verified for order {}", order_id);
        Ok(outcome)
    }
}

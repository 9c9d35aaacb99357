use async_trait::async_trait;
use uuid::Uuid;

#[derive(thiserror::Error, Debug)]
pub enum StripeError {
    #[error("stripe is not configured")]
    NotConfigured,
    #[error("stripe rejected the request: {0}")]
    Rejected(String),
    #[error("stripe request failed")]
    Upstream(#[source] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[async_trait]
pub trait StripeGateway: Send + Sync {
    /// Creates a PaymentIntent carrying the order id in its metadata so the
    /// webhook can correlate the asynchronous confirmation.
    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        order_id: Uuid,
    ) -> Result<PaymentIntent, StripeError>;
}

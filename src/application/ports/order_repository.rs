use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PaymentRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub product_id: Uuid,
    pub amount_cents: i64,
    pub method: String,
    pub status: String,
    /// M-Pesa receipt or Stripe payment-intent id, depending on the method.
    pub transaction_id: Option<String>,
    pub checkout_request_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub product_id: Uuid,
    pub payment_id: Option<Uuid>,
    pub quantity: i32,
    pub total_cents: i64,
    pub delivery_status: String,
    pub delivery_address: Option<String>,
    pub phone_number: Option<String>,
    pub mpesa_receipt_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Order joined with the names a list view needs and its payment, if any.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub order: OrderRow,
    pub product_name: String,
    pub business_name: String,
    pub buyer_name: String,
    pub payment: Option<PaymentRow>,
}

/// Orders and their payments form one aggregate: a checkout creates both
/// rows together and settlement transitions both in one transaction.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    async fn create_checkout(
        &self,
        buyer_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        total_cents: i64,
        method: &str,
        phone_number: Option<&str>,
        delivery_address: Option<&str>,
    ) -> anyhow::Result<(PaymentRow, OrderRow)>;
    /// Rolls a checkout back after the payment gateway rejected it.
    async fn abort_checkout(&self, payment_id: Uuid, order_id: Uuid) -> anyhow::Result<()>;
    async fn attach_checkout_request(
        &self,
        payment_id: Uuid,
        checkout_request_id: &str,
    ) -> anyhow::Result<()>;
    async fn attach_transaction(
        &self,
        payment_id: Uuid,
        transaction_id: &str,
    ) -> anyhow::Result<()>;
    async fn find_payment(&self, payment_id: Uuid) -> anyhow::Result<Option<PaymentRow>>;
    async fn find_payment_by_checkout_request(
        &self,
        checkout_request_id: &str,
    ) -> anyhow::Result<Option<PaymentRow>>;
    async fn find_payment_by_transaction(
        &self,
        transaction_id: &str,
    ) -> anyhow::Result<Option<PaymentRow>>;
    /// Marks a pending payment completed, moves its order to processing and
    /// decrements stock. Settling an already-settled payment is a no-op.
    /// `receipt` is the M-Pesa receipt; Stripe settlements pass `None` and
    /// keep the payment-intent id already stored as the transaction.
    async fn settle(
        &self,
        payment_id: Uuid,
        receipt: Option<&str>,
    ) -> anyhow::Result<Option<PaymentRow>>;
    /// Marks a pending payment failed. The order keeps its delivery status.
    async fn fail_payment(&self, payment_id: Uuid) -> anyhow::Result<Option<PaymentRow>>;
    async fn order_for_buyer(
        &self,
        order_id: Uuid,
        buyer_id: Uuid,
    ) -> anyhow::Result<Option<OrderDetail>>;
    async fn order_for_seller(
        &self,
        order_id: Uuid,
        seller_id: Uuid,
    ) -> anyhow::Result<Option<OrderDetail>>;
    async fn list_for_buyer(&self, buyer_id: Uuid) -> anyhow::Result<Vec<OrderDetail>>;
    async fn list_for_seller(&self, seller_id: Uuid) -> anyhow::Result<Vec<OrderDetail>>;
    /// Sets the delivery status of an order whose product belongs to the
    /// seller; stamps `delivered_at` when the status is `delivered`.
    async fn update_delivery(
        &self,
        order_id: Uuid,
        seller_id: Uuid,
        status: &str,
    ) -> anyhow::Result<Option<OrderRow>>;
}

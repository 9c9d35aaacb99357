pub mod checkout;
pub mod list_orders;
pub mod mpesa_callback;
pub mod order_detail;
pub mod payment_status;
pub mod seller_orders;
pub mod stripe_webhook;
pub mod update_delivery;

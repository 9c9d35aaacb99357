use tracing::{info, warn};

use crate::application::ports::order_repository::OrderRepository;

/// Applies an already-verified Stripe event. Signature verification is the
/// caller's job since it needs the raw request body.
pub struct HandleStripeEvent<'a, O: OrderRepository + ?Sized> {
    pub orders: &'a O,
}

#[derive(Debug, PartialEq, Eq)]
pub enum StripeEventOutcome {
    Handled,
    /// Event type we do not act on; acknowledged so Stripe stops retrying.
    Ignored,
    UnknownPayment,
}

impl<'a, O: OrderRepository + ?Sized> HandleStripeEvent<'a, O> {
    pub async fn execute(&self, event: &serde_json::Value) -> anyhow::Result<StripeEventOutcome> {
        let event_type = event.get("type").and_then(|t| t.as_str()).unwrap_or("");
        let intent = event.get("data").and_then(|d| d.get("object"));
        let intent_id = intent
            .and_then(|o| o.get("id"))
            .and_then(|id| id.as_str())
            .unwrap_or("");

        match event_type {
            "payment_intent.succeeded" => {
                let payment = match self.orders.find_payment_by_transaction(intent_id).await? {
                    Some(p) => p,
                    None => {
                        warn!(intent_id, "stripe_event_unknown_payment");
                        return Ok(StripeEventOutcome::UnknownPayment);
                    }
                };
                // The intent id is already on the row; nothing further to
                // record from the event.
                self.orders.settle(payment.id, None).await?;
                info!(payment_id = %payment.id, "stripe_payment_completed");
                Ok(StripeEventOutcome::Handled)
            }
            "payment_intent.payment_failed" => {
                let payment = match self.orders.find_payment_by_transaction(intent_id).await? {
                    Some(p) => p,
                    None => {
                        warn!(intent_id, "stripe_event_unknown_payment");
                        return Ok(StripeEventOutcome::UnknownPayment);
                    }
                };
                let reason = intent
                    .and_then(|o| o.get("last_payment_error"))
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .unwrap_or("payment failed");
                self.orders.fail_payment(payment.id).await?;
                warn!(payment_id = %payment.id, reason, "stripe_payment_failed");
                Ok(StripeEventOutcome::Handled)
            }
            _ => Ok(StripeEventOutcome::Ignored),
        }
    }
}

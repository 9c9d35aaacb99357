use tracing::{info, warn};

use crate::application::ports::mpesa_gateway::StkCallback;
use crate::application::ports::order_repository::OrderRepository;

pub struct HandleMpesaCallback<'a, O: OrderRepository + ?Sized> {
    pub orders: &'a O,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MpesaCallbackOutcome {
    /// Processed or deliberately ignored; Daraja gets its 0 either way.
    Accepted,
    /// Body did not look like an STK callback envelope at all.
    Unparseable,
}

impl<'a, O: OrderRepository + ?Sized> HandleMpesaCallback<'a, O> {
    pub async fn execute(
        &self,
        payload: &serde_json::Value,
    ) -> anyhow::Result<MpesaCallbackOutcome> {
        let Some(callback) = StkCallback::parse(payload) else {
            return Ok(MpesaCallbackOutcome::Unparseable);
        };
        let payment = match self
            .orders
            .find_payment_by_checkout_request(&callback.checkout_request_id)
            .await?
        {
            Some(p) => p,
            None => {
                // Daraja retries callbacks; an id we never issued (or one
                // whose checkout was rolled back) is acknowledged and dropped.
                warn!(
                    checkout_request_id = %callback.checkout_request_id,
                    result_code = callback.result_code,
                    "mpesa_callback_unknown_checkout"
                );
                return Ok(MpesaCallbackOutcome::Accepted);
            }
        };

        if callback.succeeded() {
            self.orders
                .settle(payment.id, callback.receipt_number.as_deref())
                .await?;
            info!(payment_id = %payment.id, "mpesa_payment_completed");
        } else {
            self.orders.fail_payment(payment.id).await?;
            warn!(
                payment_id = %payment.id,
                result_code = callback.result_code,
                result_desc = %callback.result_desc,
                "mpesa_payment_failed"
            );
        }
        Ok(MpesaCallbackOutcome::Accepted)
    }
}

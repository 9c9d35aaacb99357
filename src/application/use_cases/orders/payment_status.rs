use tracing::warn;
use uuid::Uuid;

use crate::application::ports::buyer_repository::BuyerRepository;
use crate::application::ports::mpesa_gateway::{MpesaError, MpesaGateway};
use crate::application::ports::order_repository::OrderRepository;
use crate::domain::marketplace::order::{PaymentMethod, PaymentStatus};

/// Local payment status, refreshed against Daraja while an STK push is
/// still pending. The callback usually wins; polling covers lost ones.
pub struct PaymentStatusCheck<'a, B, O, M>
where
    B: BuyerRepository + ?Sized,
    O: OrderRepository + ?Sized,
    M: MpesaGateway + ?Sized,
{
    pub buyers: &'a B,
    pub orders: &'a O,
    pub mpesa: &'a M,
}

#[derive(Debug)]
pub struct PaymentStatusView {
    pub order_id: Uuid,
    pub delivery_status: String,
    pub payment_status: String,
    pub receipt: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum PaymentStatusOutcome {
    NoProfile,
    NotFound,
    Status(PaymentStatusView),
}

impl<'a, B, O, M> PaymentStatusCheck<'a, B, O, M>
where
    B: BuyerRepository + ?Sized,
    O: OrderRepository + ?Sized,
    M: MpesaGateway + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> anyhow::Result<PaymentStatusOutcome> {
        let buyer = match self.buyers.find_by_user(user_id).await? {
            Some(b) => b,
            None => return Ok(PaymentStatusOutcome::NoProfile),
        };
        let detail = match self.orders.order_for_buyer(order_id, buyer.id).await? {
            Some(d) => d,
            None => return Ok(PaymentStatusOutcome::NotFound),
        };

        let mut message = None;
        if let Some(payment) = &detail.payment {
            let pending_stk = payment.status == PaymentStatus::Pending.as_str()
                && payment.method == PaymentMethod::Mpesa.as_str();
            if let (true, Some(checkout_request_id)) =
                (pending_stk, payment.checkout_request_id.as_deref())
            {
                match self.mpesa.query(checkout_request_id).await {
                    Ok(outcome) => {
                        message = Some(outcome.result_desc.clone());
                        match outcome.status() {
                            // The query response carries no receipt; only
                            // the callback does.
                            "completed" => {
                                self.orders.settle(payment.id, None).await?;
                            }
                            "cancelled" | "timeout" => {
                                self.orders.fail_payment(payment.id).await?;
                            }
                            _ => {}
                        }
                    }
                    // Daraja rejects the query while the push is still in
                    // flight; the payment simply stays pending.
                    Err(MpesaError::Rejected(desc)) => message = Some(desc),
                    Err(MpesaError::NotConfigured) => {}
                    Err(MpesaError::Upstream(source)) => {
                        warn!(%order_id, error = %source, "stk_query_failed");
                    }
                }
            }
        }

        // Re-read so the view reflects any transition made above.
        let detail = match self.orders.order_for_buyer(order_id, buyer.id).await? {
            Some(d) => d,
            None => return Ok(PaymentStatusOutcome::NotFound),
        };
        let (payment_status, receipt) = match &detail.payment {
            Some(p) => (p.status.clone(), p.transaction_id.clone()),
            None => ("none".to_string(), None),
        };
        Ok(PaymentStatusOutcome::Status(PaymentStatusView {
            order_id: detail.order.id,
            delivery_status: detail.order.delivery_status.clone(),
            payment_status,
            receipt,
            message,
        }))
    }
}

use tracing::warn;
use uuid::Uuid;

use crate::application::ports::buyer_repository::BuyerRepository;
use crate::application::ports::mpesa_gateway::{MpesaError, MpesaGateway};
use crate::application::ports::order_repository::OrderRepository;
use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::progress_repository::ProgressRepository;
use crate::application::ports::stripe_gateway::{StripeError, StripeGateway};
use crate::application::services::payments::{
    account_reference, clamp_description, clamp_reference, normalize_phone, phone_is_plausible,
};
use crate::domain::marketplace::order::{PaymentMethod, mpesa_amount};
use crate::domain::marketplace::verification::{VerificationProgress, VerificationTier};

pub struct Checkout<'a, B, P, O, R, M, S>
where
    B: BuyerRepository + ?Sized,
    P: ProductRepository + ?Sized,
    O: OrderRepository + ?Sized,
    R: ProgressRepository + ?Sized,
    M: MpesaGateway + ?Sized,
    S: StripeGateway + ?Sized,
{
    pub buyers: &'a B,
    pub products: &'a P,
    pub orders: &'a O,
    pub progress: &'a R,
    pub mpesa: &'a M,
    pub stripe: &'a S,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub method: String,
    pub phone_number: Option<String>,
    pub delivery_address: Option<String>,
}

#[derive(Debug)]
pub enum CheckoutOutcome {
    /// STK push accepted; the payment settles via callback or polling.
    MpesaStarted {
        order_id: Uuid,
        checkout_request_id: String,
        customer_message: String,
    },
    /// PaymentIntent created; the client confirms with the secret.
    StripeStarted {
        order_id: Uuid,
        client_secret: String,
    },
    NoProfile,
    NotVerified(VerificationProgress),
    /// Missing, inactive, or out of stock.
    ProductUnavailable,
    InvalidInput(&'static str),
    /// The gateway refused the payment; the pending pair was rolled back.
    GatewayRejected(String),
    GatewayUnavailable,
}

impl<'a, B, P, O, R, M, S> Checkout<'a, B, P, O, R, M, S>
where
    B: BuyerRepository + ?Sized,
    P: ProductRepository + ?Sized,
    O: OrderRepository + ?Sized,
    R: ProgressRepository + ?Sized,
    M: MpesaGateway + ?Sized,
    S: StripeGateway + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        req: &CheckoutRequest,
        buyer_required: i64,
    ) -> anyhow::Result<CheckoutOutcome> {
        let Some(method) = PaymentMethod::parse(&req.method) else {
            return Ok(CheckoutOutcome::InvalidInput("unknown payment method"));
        };
        let buyer = match self.buyers.find_by_user(user_id).await? {
            Some(b) => b,
            None => return Ok(CheckoutOutcome::NoProfile),
        };
        let progress = VerificationProgress {
            solved: self
                .progress
                .count_solves_by_difficulty(
                    user_id,
                    VerificationTier::Buyer.difficulty().as_str(),
                )
                .await?,
            required: buyer_required,
        };
        if !progress.verified() {
            return Ok(CheckoutOutcome::NotVerified(progress));
        }
        let product = match self.products.find_by_id(product_id).await? {
            Some(p) if p.is_active && p.stock > 0 => p,
            _ => return Ok(CheckoutOutcome::ProductUnavailable),
        };

        let quantity = 1;
        let total_cents = product.price_cents * i64::from(quantity);
        let delivery = req
            .delivery_address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty());

        match method {
            PaymentMethod::Mpesa => {
                let Some(raw_phone) = req
                    .phone_number
                    .as_deref()
                    .filter(|p| !p.trim().is_empty())
                else {
                    return Ok(CheckoutOutcome::InvalidInput("a phone number is required"));
                };
                let phone = normalize_phone(raw_phone);
                if !phone_is_plausible(&phone) {
                    return Ok(CheckoutOutcome::InvalidInput("phone number is not valid"));
                }

                let (payment, order) = self
                    .orders
                    .create_checkout(
                        buyer.id,
                        product.id,
                        quantity,
                        total_cents,
                        method.as_str(),
                        Some(&phone),
                        delivery,
                    )
                    .await?;
                let reference = clamp_reference(&account_reference(&order.id));
                let description = clamp_description(&product.name);
                match self
                    .mpesa
                    .stk_push(&phone, mpesa_amount(total_cents), &reference, &description)
                    .await
                {
                    Ok(ack) => {
                        self.orders
                            .attach_checkout_request(payment.id, &ack.checkout_request_id)
                            .await?;
                        Ok(CheckoutOutcome::MpesaStarted {
                            order_id: order.id,
                            checkout_request_id: ack.checkout_request_id,
                            customer_message: ack.customer_message,
                        })
                    }
                    Err(err) => {
                        self.orders.abort_checkout(payment.id, order.id).await?;
                        Ok(match err {
                            MpesaError::NotConfigured => CheckoutOutcome::GatewayUnavailable,
                            MpesaError::Rejected(message) => {
                                CheckoutOutcome::GatewayRejected(message)
                            }
                            MpesaError::Upstream(source) => {
                                warn!(order_id = %order.id, error = %source, "stk_push_failed");
                                CheckoutOutcome::GatewayRejected(
                                    "could not reach the payment gateway".into(),
                                )
                            }
                        })
                    }
                }
            }
            PaymentMethod::Stripe => {
                let (payment, order) = self
                    .orders
                    .create_checkout(
                        buyer.id,
                        product.id,
                        quantity,
                        total_cents,
                        method.as_str(),
                        None,
                        delivery,
                    )
                    .await?;
                match self
                    .stripe
                    .create_payment_intent(total_cents, "kes", order.id)
                    .await
                {
                    Ok(intent) => {
                        self.orders
                            .attach_transaction(payment.id, &intent.id)
                            .await?;
                        Ok(CheckoutOutcome::StripeStarted {
                            order_id: order.id,
                            client_secret: intent.client_secret,
                        })
                    }
                    Err(err) => {
                        self.orders.abort_checkout(payment.id, order.id).await?;
                        Ok(match err {
                            StripeError::NotConfigured => CheckoutOutcome::GatewayUnavailable,
                            StripeError::Rejected(message) => {
                                CheckoutOutcome::GatewayRejected(message)
                            }
                            StripeError::Upstream(source) => {
                                warn!(order_id = %order.id, error = %source, "payment_intent_failed");
                                CheckoutOutcome::GatewayRejected(
                                    "could not reach the payment gateway".into(),
                                )
                            }
                        })
                    }
                }
            }
        }
    }
}

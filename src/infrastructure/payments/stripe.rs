use async_trait::async_trait;
use uuid::Uuid;

use crate::application::ports::stripe_gateway::{PaymentIntent, StripeError, StripeGateway};
use crate::bootstrap::config::Config;

const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Thin client over Stripe's form-encoded REST API. Only the call the
/// checkout needs; webhook signatures are checked in the payments service.
pub struct StripeClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: Option<String>,
}

impl StripeClient {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: STRIPE_API_BASE.to_string(),
            secret_key: cfg.stripe_secret_key.clone(),
        }
    }

    pub fn new(base_url: &str, secret_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: Some(secret_key.to_string()),
        }
    }
}

#[async_trait]
impl StripeGateway for StripeClient {
    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        order_id: Uuid,
    ) -> Result<PaymentIntent, StripeError> {
        let secret = self.secret_key.as_ref().ok_or(StripeError::NotConfigured)?;
        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", currency.to_string()),
            ("metadata[order_id]", order_id.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];
        let resp = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(secret)
            .form(&params)
            .send()
            .await
            .map_err(|e| StripeError::Upstream(e.into()))?;
        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| StripeError::Upstream(e.into()))?;
        if !status.is_success() {
            let message = body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("payment intent creation failed")
                .to_string();
            return Err(StripeError::Rejected(message));
        }
        let id = body.get("id").and_then(|v| v.as_str());
        let client_secret = body.get("client_secret").and_then(|v| v.as_str());
        match (id, client_secret) {
            (Some(id), Some(client_secret)) => Ok(PaymentIntent {
                id: id.to_string(),
                client_secret: client_secret.to_string(),
            }),
            _ => Err(StripeError::Upstream(anyhow::anyhow!(
                "payment intent response missing id or client_secret"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn payment_intent_posts_form_and_parses_response() {
        let server = MockServer::start();
        let order_id = Uuid::new_v4();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/payment_intents")
                .header("authorization", "Bearer sk_test_123")
                .body_contains("amount=45000")
                .body_contains("currency=kes");
            then.status(200).json_body(json!({
                "id": "pi_3MtwBwLkdIwHu7ix28a3tqPa",
                "client_secret": "pi_3MtwBwLkdIwHu7ix28a3tqPa_secret_YrKJUKribcBjcG8HVhfZluoGH",
                "status": "requires_payment_method"
            }));
        });

        let intent = StripeClient::new(&server.base_url(), "sk_test_123")
            .create_payment_intent(45000, "kes", order_id)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(intent.id, "pi_3MtwBwLkdIwHu7ix28a3tqPa");
        assert!(intent.client_secret.starts_with("pi_"));
    }

    #[tokio::test]
    async fn stripe_error_message_is_surfaced() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/payment_intents");
            then.status(400).json_body(json!({
                "error": {"type": "invalid_request_error", "message": "Amount must be at least 50 cents"}
            }));
        });

        let err = StripeClient::new(&server.base_url(), "sk_test_123")
            .create_payment_intent(1, "kes", Uuid::new_v4())
            .await
            .unwrap_err();
        match err {
            StripeError::Rejected(msg) => assert!(msg.contains("at least 50 cents")),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_secret_key_is_not_configured() {
        let client = StripeClient {
            client: reqwest::Client::new(),
            base_url: STRIPE_API_BASE.to_string(),
            secret_key: None,
        };
        assert!(matches!(
            client.create_payment_intent(100, "kes", Uuid::new_v4()).await,
            Err(StripeError::NotConfigured)
        ));
    }
}

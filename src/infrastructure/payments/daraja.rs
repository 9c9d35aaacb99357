use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine as _;
use chrono::Local;
use serde_json::json;
use tokio::sync::Mutex;

use crate::application::ports::mpesa_gateway::{
    MpesaError, MpesaGateway, StkPushAck, StkQueryOutcome,
};
use crate::bootstrap::config::Config;

// Daraja access tokens live for an hour; refresh a little early.
const TOKEN_TTL: Duration = Duration::from_secs(50 * 60);

struct Credentials {
    consumer_key: String,
    consumer_secret: String,
    passkey: String,
    callback_url: String,
}

struct CachedToken {
    value: String,
    fetched_at: Instant,
}

/// Safaricom Daraja client for STK push (Lipa na M-Pesa Online).
/// Built unconfigured when the consumer credentials are absent, in which
/// case every call reports [`MpesaError::NotConfigured`].
pub struct DarajaClient {
    client: reqwest::Client,
    base_url: String,
    shortcode: String,
    credentials: Option<Credentials>,
    token: Mutex<Option<CachedToken>>,
}

impl DarajaClient {
    pub fn from_config(cfg: &Config) -> Self {
        let credentials = match (
            cfg.mpesa_consumer_key.clone(),
            cfg.mpesa_consumer_secret.clone(),
            cfg.mpesa_passkey.clone(),
            cfg.mpesa_callback_url.clone(),
        ) {
            (Some(consumer_key), Some(consumer_secret), Some(passkey), Some(callback_url)) => {
                Some(Credentials {
                    consumer_key,
                    consumer_secret,
                    passkey,
                    callback_url,
                })
            }
            _ => None,
        };
        Self {
            client: reqwest::Client::new(),
            base_url: cfg.mpesa_api_base.clone(),
            shortcode: cfg.mpesa_shortcode.clone(),
            credentials,
            token: Mutex::new(None),
        }
    }

    pub fn new(
        base_url: &str,
        consumer_key: &str,
        consumer_secret: &str,
        shortcode: &str,
        passkey: &str,
        callback_url: &str,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            shortcode: shortcode.to_string(),
            credentials: Some(Credentials {
                consumer_key: consumer_key.to_string(),
                consumer_secret: consumer_secret.to_string(),
                passkey: passkey.to_string(),
                callback_url: callback_url.to_string(),
            }),
            token: Mutex::new(None),
        }
    }

    fn credentials(&self) -> Result<&Credentials, MpesaError> {
        self.credentials.as_ref().ok_or(MpesaError::NotConfigured)
    }

    async fn access_token(&self) -> Result<String, MpesaError> {
        let creds = self.credentials()?;
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.fetched_at.elapsed() < TOKEN_TTL {
                return Ok(cached.value.clone());
            }
        }
        let url = format!(
            "{}/oauth/v1/generate?grant_type=client_credentials",
            self.base_url
        );
        let resp = self
            .client
            .get(&url)
            .basic_auth(&creds.consumer_key, Some(&creds.consumer_secret))
            .send()
            .await
            .map_err(|e| MpesaError::Upstream(e.into()))?;
        if !resp.status().is_success() {
            return Err(MpesaError::Upstream(anyhow::anyhow!(
                "oauth endpoint returned {}",
                resp.status()
            )));
        }
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| MpesaError::Upstream(e.into()))?;
        let token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| MpesaError::Upstream(anyhow::anyhow!("no access_token in response")))?
            .to_string();
        *guard = Some(CachedToken {
            value: token.clone(),
            fetched_at: Instant::now(),
        });
        Ok(token)
    }

    /// Password = base64(shortcode + passkey + timestamp), with the
    /// timestamp it was derived from.
    fn password(&self, creds: &Credentials) -> (String, String) {
        let timestamp = Local::now().format("%Y%m%d%H%M%S").to_string();
        let raw = format!("{}{}{}", self.shortcode, creds.passkey, timestamp);
        let password = base64::engine::general_purpose::STANDARD.encode(raw);
        (password, timestamp)
    }
}

fn json_i64(value: Option<&serde_json::Value>) -> Option<i64> {
    match value? {
        serde_json::Value::String(s) => s.parse().ok(),
        serde_json::Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

fn json_str(value: &serde_json::Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl MpesaGateway for DarajaClient {
    async fn stk_push(
        &self,
        phone: &str,
        amount: i64,
        account_reference: &str,
        description: &str,
    ) -> Result<StkPushAck, MpesaError> {
        let creds = self.credentials()?;
        let token = self.access_token().await?;
        let (password, timestamp) = self.password(creds);
        let payload = json!({
            "BusinessShortCode": self.shortcode,
            "Password": password,
            "Timestamp": timestamp,
            "TransactionType": "CustomerPayBillOnline",
            "Amount": amount,
            "PartyA": phone,
            "PartyB": self.shortcode,
            "PhoneNumber": phone,
            "CallBackURL": creds.callback_url,
            "AccountReference": account_reference,
            "TransactionDesc": description,
        });
        let resp = self
            .client
            .post(format!("{}/mpesa/stkpush/v1/processrequest", self.base_url))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MpesaError::Upstream(e.into()))?;
        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| MpesaError::Upstream(e.into()))?;
        let response_code = body.get("ResponseCode").and_then(|v| v.as_str());
        if status.is_success() && response_code == Some("0") {
            Ok(StkPushAck {
                merchant_request_id: json_str(&body, "MerchantRequestID"),
                checkout_request_id: json_str(&body, "CheckoutRequestID"),
                customer_message: json_str(&body, "CustomerMessage"),
            })
        } else {
            let message = body
                .get("errorMessage")
                .or_else(|| body.get("ResponseDescription"))
                .and_then(|v| v.as_str())
                .unwrap_or("STK push failed")
                .to_string();
            Err(MpesaError::Rejected(message))
        }
    }

    async fn query(&self, checkout_request_id: &str) -> Result<StkQueryOutcome, MpesaError> {
        let creds = self.credentials()?;
        let token = self.access_token().await?;
        let (password, timestamp) = self.password(creds);
        let payload = json!({
            "BusinessShortCode": self.shortcode,
            "Password": password,
            "Timestamp": timestamp,
            "CheckoutRequestID": checkout_request_id,
        });
        let resp = self
            .client
            .post(format!("{}/mpesa/stkpushquery/v1/query", self.base_url))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MpesaError::Upstream(e.into()))?;
        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| MpesaError::Upstream(e.into()))?;
        if !status.is_success() {
            // Daraja answers 500 with an errorMessage while the push is
            // still being processed; surface it as a rejection and let the
            // caller keep the payment pending.
            let message = body
                .get("errorMessage")
                .and_then(|v| v.as_str())
                .unwrap_or("query failed")
                .to_string();
            return Err(MpesaError::Rejected(message));
        }
        let result_desc = body
            .get("ResultDesc")
            .or_else(|| body.get("ResponseDescription"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(StkQueryOutcome {
            result_code: json_i64(body.get("ResultCode")).unwrap_or(-1),
            result_desc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer) -> DarajaClient {
        DarajaClient::new(
            &server.base_url(),
            "key",
            "secret",
            "174379",
            "passkey",
            "https://shop.example/api/marketplace/payments/mpesa/callback",
        )
    }

    fn mock_oauth(server: &MockServer) -> httpmock::Mock<'_> {
        server.mock(|when, then| {
            when.method(GET)
                .path("/oauth/v1/generate")
                .query_param("grant_type", "client_credentials");
            then.status(200)
                .json_body(json!({"access_token": "tok-1", "expires_in": "3599"}));
        })
    }

    #[tokio::test]
    async fn stk_push_sends_payload_and_parses_ack() {
        let server = MockServer::start();
        let oauth = mock_oauth(&server);
        let push = server.mock(|when, then| {
            when.method(POST)
                .path("/mpesa/stkpush/v1/processrequest")
                .header("authorization", "Bearer tok-1")
                .json_body_partial(
                    r#"{"TransactionType": "CustomerPayBillOnline", "Amount": 150,
                        "PartyA": "254712345678", "PhoneNumber": "254712345678",
                        "AccountReference": "ORD00000001"}"#,
                );
            then.status(200).json_body(json!({
                "MerchantRequestID": "29115-34620561-1",
                "CheckoutRequestID": "ws_CO_191220191020363925",
                "ResponseCode": "0",
                "ResponseDescription": "Success. Request accepted for processing",
                "CustomerMessage": "Success. Request accepted for processing"
            }));
        });

        let ack = client(&server)
            .stk_push("254712345678", 150, "ORD00000001", "Momento order")
            .await
            .unwrap();

        oauth.assert();
        push.assert();
        assert_eq!(ack.checkout_request_id, "ws_CO_191220191020363925");
        assert_eq!(ack.merchant_request_id, "29115-34620561-1");
    }

    #[tokio::test]
    async fn access_token_is_cached_between_calls() {
        let server = MockServer::start();
        let oauth = mock_oauth(&server);
        let push = server.mock(|when, then| {
            when.method(POST).path("/mpesa/stkpush/v1/processrequest");
            then.status(200).json_body(json!({
                "MerchantRequestID": "m", "CheckoutRequestID": "c",
                "ResponseCode": "0", "CustomerMessage": "ok"
            }));
        });

        let daraja = client(&server);
        daraja.stk_push("254712345678", 10, "ref", "desc").await.unwrap();
        daraja.stk_push("254712345678", 10, "ref", "desc").await.unwrap();

        assert_eq!(oauth.hits(), 1);
        assert_eq!(push.hits(), 2);
    }

    #[tokio::test]
    async fn rejected_push_carries_the_gateway_message() {
        let server = MockServer::start();
        let _oauth = mock_oauth(&server);
        server.mock(|when, then| {
            when.method(POST).path("/mpesa/stkpush/v1/processrequest");
            then.status(400).json_body(json!({
                "requestId": "1234",
                "errorCode": "400.002.02",
                "errorMessage": "Bad Request - Invalid PhoneNumber"
            }));
        });

        let err = client(&server)
            .stk_push("07123", 10, "ref", "desc")
            .await
            .unwrap_err();
        match err {
            MpesaError::Rejected(msg) => assert!(msg.contains("Invalid PhoneNumber")),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unconfigured_client_refuses_without_calling_out() {
        let cfg = DarajaClient {
            client: reqwest::Client::new(),
            base_url: "https://sandbox.safaricom.co.ke".into(),
            shortcode: "174379".into(),
            credentials: None,
            token: Mutex::new(None),
        };
        assert!(matches!(
            cfg.stk_push("254712345678", 10, "ref", "desc").await,
            Err(MpesaError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn query_parses_string_result_codes() {
        let server = MockServer::start();
        let _oauth = mock_oauth(&server);
        server.mock(|when, then| {
            when.method(POST).path("/mpesa/stkpushquery/v1/query");
            then.status(200).json_body(json!({
                "ResponseCode": "0",
                "ResponseDescription": "The service request has been accepted successsfully",
                "MerchantRequestID": "22205-34066-1",
                "CheckoutRequestID": "ws_CO_13012021093521236557",
                "ResultCode": "1032",
                "ResultDesc": "Request cancelled by user"
            }));
        });

        let outcome = client(&server).query("ws_CO_13012021093521236557").await.unwrap();
        assert_eq!(outcome.result_code, 1032);
        assert_eq!(outcome.status(), "cancelled");
    }
}

use async_trait::async_trait;
use serde_json::json;

use crate::application::ports::mailer::Mailer;

const BREVO_API_BASE: &str = "https://api.brevo.com";

/// Transactional email through the Brevo REST API. Brevo acknowledges an
/// accepted message with HTTP 201.
pub struct BrevoMailer {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl BrevoMailer {
    pub fn new(api_key: &str, sender_email: &str, sender_name: &str) -> Self {
        Self::with_base_url(BREVO_API_BASE, api_key, sender_email, sender_name)
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        sender_email: &str,
        sender_name: &str,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            sender_email: sender_email.to_string(),
            sender_name: sender_name.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    async fn send(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        html_body: &str,
    ) -> anyhow::Result<()> {
        let payload = json!({
            "sender": {"name": self.sender_name, "email": self.sender_email},
            "to": [{"email": to_email, "name": to_name}],
            "subject": subject,
            "htmlContent": html_body,
        });
        let resp = self
            .client
            .post(format!("{}/v3/smtp/email", self.base_url))
            .header("accept", "application/json")
            .header("api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("brevo request failed: {e}"))?;
        if resp.status().as_u16() != 201 {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("brevo returned {status}: {body}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn send_posts_brevo_envelope() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v3/smtp/email")
                .header("api-key", "xkeysib-test")
                .json_body_partial(
                    r#"{"sender": {"name": "Momento", "email": "noreply@momento.example"},
                        "to": [{"email": "alice@example.com"}],
                        "subject": "Verify Your Email - Momento"}"#,
                );
            then.status(201).json_body(json!({"messageId": "<202307-1@smtp-relay>"}));
        });

        let mailer = BrevoMailer::with_base_url(
            &server.base_url(),
            "xkeysib-test",
            "noreply@momento.example",
            "Momento",
        );
        mailer
            .send(
                "alice@example.com",
                "alice",
                "Verify Your Email - Momento",
                "<h1>Welcome</h1>",
            )
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn non_201_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v3/smtp/email");
            then.status(401)
                .json_body(json!({"code": "unauthorized", "message": "Key not found"}));
        });

        let mailer =
            BrevoMailer::with_base_url(&server.base_url(), "bad-key", "noreply@x", "Momento");
        let err = mailer
            .send("a@example.com", "a", "s", "<p>b</p>")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}

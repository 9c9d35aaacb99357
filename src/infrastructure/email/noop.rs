use async_trait::async_trait;
use tracing::info;

use crate::application::ports::mailer::Mailer;

/// Stands in when no Brevo key is configured: logs the message instead of
/// sending it, so local flows (and the verification links inside) stay
/// visible in the server output.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(
        &self,
        to_email: &str,
        _to_name: &str,
        subject: &str,
        html_body: &str,
    ) -> anyhow::Result<()> {
        info!(to = %to_email, subject = %subject, body_len = html_body.len(), "email_skipped_no_api_key");
        Ok(())
    }
}

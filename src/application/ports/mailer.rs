use async_trait::async_trait;

/// Outbound transactional email. Implementations decide transport;
/// callers only hand over a recipient and a rendered message.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to_email: &str,
        to_name: &str,
        subject: &str,
        html_body: &str,
    ) -> anyhow::Result<()>;
}

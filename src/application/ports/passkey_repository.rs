use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Stored WebAuthn credential. The credential body is the serialized
/// `Passkey` from webauthn-rs, kept opaque at this layer.
#[derive(Debug, Clone)]
pub struct PasskeyRow {
    pub user_id: Uuid,
    pub credential: serde_json::Value,
    pub credential_id: String,
    pub sign_count: i64,
    pub registered_at: DateTime<Utc>,
}

#[async_trait]
pub trait PasskeyRepository: Send + Sync {
    /// Inserts or replaces the single credential slot for a user.
    async fn save(
        &self,
        user_id: Uuid,
        credential: &serde_json::Value,
        credential_id: &str,
    ) -> anyhow::Result<()>;
    async fn find_for_user(&self, user_id: Uuid) -> anyhow::Result<Option<PasskeyRow>>;
    /// Persists the post-authentication credential state (updated counters).
    async fn update_credential(
        &self,
        user_id: Uuid,
        credential: &serde_json::Value,
        sign_count: i64,
    ) -> anyhow::Result<()>;
    async fn remove(&self, user_id: Uuid) -> anyhow::Result<bool>;
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub email_verified: bool,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// A user found through one of their one-shot tokens, with that token's
/// expiry alongside so the caller can distinguish invalid from stale.
#[derive(Debug, Clone)]
pub struct TokenLookup {
    pub user: UserRow,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
        is_admin: bool,
        email_verified: bool,
    ) -> anyhow::Result<UserRow>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRow>>;
    async fn touch_last_login(&self, id: Uuid) -> anyhow::Result<()>;
    async fn set_email_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    async fn find_by_email_token(&self, token: &str) -> anyhow::Result<Option<TokenLookup>>;
    async fn mark_email_verified(&self, id: Uuid) -> anyhow::Result<()>;
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    async fn find_by_reset_token(&self, token: &str) -> anyhow::Result<Option<TokenLookup>>;
    /// Replaces the password hash and consumes any outstanding reset token.
    async fn reset_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()>;
    async fn promote_admin(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn set_active(&self, id: Uuid, active: bool) -> anyhow::Result<Option<UserRow>>;
    async fn list_users(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<UserRow>>;
}

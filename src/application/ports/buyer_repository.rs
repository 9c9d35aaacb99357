use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct BuyerRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait BuyerRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, display_name: &str) -> anyhow::Result<BuyerRow>;
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<BuyerRow>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<BuyerRow>>;
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SellerRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait SellerRepository: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        business_name: &str,
        description: Option<&str>,
    ) -> anyhow::Result<SellerRow>;
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<SellerRow>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<SellerRow>>;
}

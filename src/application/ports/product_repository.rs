use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub stock: i32,
    pub image_filename: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row joined with its seller's business name.
#[derive(Debug, Clone)]
pub struct ListedProduct {
    pub product: ProductRow,
    pub business_name: String,
}

#[derive(Debug, Clone)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(
        &self,
        seller_id: Uuid,
        name: &str,
        description: &str,
        category: &str,
        price_cents: i64,
        stock: i32,
    ) -> anyhow::Result<ProductRow>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<ProductRow>>;
    async fn list_active(&self) -> anyhow::Result<Vec<ListedProduct>>;
    async fn list_for_seller(&self, seller_id: Uuid) -> anyhow::Result<Vec<ProductRow>>;
    /// Applies the patch when the product belongs to the seller.
    async fn update(
        &self,
        id: Uuid,
        seller_id: Uuid,
        patch: &ProductPatch,
    ) -> anyhow::Result<Option<ProductRow>>;
    async fn set_image(
        &self,
        id: Uuid,
        seller_id: Uuid,
        filename: &str,
    ) -> anyhow::Result<Option<ProductRow>>;
    async fn delete(&self, id: Uuid, seller_id: Uuid) -> anyhow::Result<bool>;
}

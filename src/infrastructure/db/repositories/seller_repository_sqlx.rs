use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::seller_repository::{SellerRepository, SellerRow};
use crate::infrastructure::db::PgPool;

pub struct SqlxSellerRepository {
    pub pool: PgPool,
}

impl SqlxSellerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_seller(r: &PgRow) -> SellerRow {
    SellerRow {
        id: r.get("id"),
        user_id: r.get("user_id"),
        business_name: r.get("business_name"),
        description: r.try_get("description").ok(),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl SellerRepository for SqlxSellerRepository {
    async fn create(
        &self,
        user_id: Uuid,
        business_name: &str,
        description: Option<&str>,
    ) -> anyhow::Result<SellerRow> {
        let row = sqlx::query(
            r#"INSERT INTO seller_profiles (user_id, business_name, description)
               VALUES ($1, $2, $3)
               RETURNING id, user_id, business_name, description, created_at"#,
        )
        .bind(user_id)
        .bind(business_name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_seller(&row))
    }

    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<SellerRow>> {
        let row = sqlx::query(
            r#"SELECT id, user_id, business_name, description, created_at
               FROM seller_profiles WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_seller(&r)))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<SellerRow>> {
        let row = sqlx::query(
            r#"SELECT id, user_id, business_name, description, created_at
               FROM seller_profiles WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_seller(&r)))
    }
}

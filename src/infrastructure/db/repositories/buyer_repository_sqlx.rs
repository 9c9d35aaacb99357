use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::buyer_repository::{BuyerRepository, BuyerRow};
use crate::infrastructure::db::PgPool;

pub struct SqlxBuyerRepository {
    pub pool: PgPool,
}

impl SqlxBuyerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_buyer(r: &PgRow) -> BuyerRow {
    BuyerRow {
        id: r.get("id"),
        user_id: r.get("user_id"),
        display_name: r.get("display_name"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl BuyerRepository for SqlxBuyerRepository {
    async fn create(&self, user_id: Uuid, display_name: &str) -> anyhow::Result<BuyerRow> {
        let row = sqlx::query(
            r#"INSERT INTO buyer_profiles (user_id, display_name)
               VALUES ($1, $2)
               RETURNING id, user_id, display_name, created_at"#,
        )
        .bind(user_id)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_buyer(&row))
    }

    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<BuyerRow>> {
        let row = sqlx::query(
            r#"SELECT id, user_id, display_name, created_at
               FROM buyer_profiles WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_buyer(&r)))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<BuyerRow>> {
        let row = sqlx::query(
            r#"SELECT id, user_id, display_name, created_at
               FROM buyer_profiles WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_buyer(&r)))
    }
}

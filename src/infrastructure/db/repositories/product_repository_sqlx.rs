use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::product_repository::{
    ListedProduct, ProductPatch, ProductRepository, ProductRow,
};
use crate::infrastructure::db::PgPool;

pub struct SqlxProductRepository {
    pub pool: PgPool,
}

impl SqlxProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_product(r: &PgRow) -> ProductRow {
    ProductRow {
        id: r.get("id"),
        seller_id: r.get("seller_id"),
        name: r.get("name"),
        description: r.get("description"),
        category: r.get("category"),
        price_cents: r.get("price_cents"),
        stock: r.get("stock"),
        image_filename: r.try_get("image_filename").ok(),
        is_active: r.get("is_active"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl ProductRepository for SqlxProductRepository {
    async fn create(
        &self,
        seller_id: Uuid,
        name: &str,
        description: &str,
        category: &str,
        price_cents: i64,
        stock: i32,
    ) -> anyhow::Result<ProductRow> {
        let row = sqlx::query(
            r#"INSERT INTO products (seller_id, name, description, category, price_cents, stock)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, seller_id, name, description, category, price_cents, stock,
                         image_filename, is_active, created_at, updated_at"#,
        )
        .bind(seller_id)
        .bind(name)
        .bind(description)
        .bind(category)
        .bind(price_cents)
        .bind(stock)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_product(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<ProductRow>> {
        let row = sqlx::query(
            r#"SELECT id, seller_id, name, description, category, price_cents, stock,
                      image_filename, is_active, created_at, updated_at
               FROM products WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_product(&r)))
    }

    async fn list_active(&self) -> anyhow::Result<Vec<ListedProduct>> {
        let rows = sqlx::query(
            r#"SELECT p.id, p.seller_id, p.name, p.description, p.category, p.price_cents,
                      p.stock, p.image_filename, p.is_active, p.created_at, p.updated_at,
                      s.business_name
               FROM products p
               JOIN seller_profiles s ON s.id = p.seller_id
               WHERE p.is_active AND p.stock > 0
               ORDER BY p.created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| ListedProduct {
                product: map_product(r),
                business_name: r.get("business_name"),
            })
            .collect())
    }

    async fn list_for_seller(&self, seller_id: Uuid) -> anyhow::Result<Vec<ProductRow>> {
        let rows = sqlx::query(
            r#"SELECT id, seller_id, name, description, category, price_cents, stock,
                      image_filename, is_active, created_at, updated_at
               FROM products WHERE seller_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_product).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        seller_id: Uuid,
        patch: &ProductPatch,
    ) -> anyhow::Result<Option<ProductRow>> {
        let row = sqlx::query(
            r#"UPDATE products SET
                   name = COALESCE($3, name),
                   description = COALESCE($4, description),
                   category = COALESCE($5, category),
                   price_cents = COALESCE($6, price_cents),
                   stock = COALESCE($7, stock),
                   is_active = COALESCE($8, is_active),
                   updated_at = now()
               WHERE id = $1 AND seller_id = $2
               RETURNING id, seller_id, name, description, category, price_cents, stock,
                         image_filename, is_active, created_at, updated_at"#,
        )
        .bind(id)
        .bind(seller_id)
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.category.as_deref())
        .bind(patch.price_cents)
        .bind(patch.stock)
        .bind(patch.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_product(&r)))
    }

    async fn set_image(
        &self,
        id: Uuid,
        seller_id: Uuid,
        filename: &str,
    ) -> anyhow::Result<Option<ProductRow>> {
        let row = sqlx::query(
            r#"UPDATE products SET image_filename = $3, updated_at = now()
               WHERE id = $1 AND seller_id = $2
               RETURNING id, seller_id, name, description, category, price_cents, stock,
                         image_filename, is_active, created_at, updated_at"#,
        )
        .bind(id)
        .bind(seller_id)
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_product(&r)))
    }

    async fn delete(&self, id: Uuid, seller_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM products WHERE id = $1 AND seller_id = $2")
            .bind(id)
            .bind(seller_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::user_repository::{TokenLookup, UserRepository, UserRow};
use crate::infrastructure::db::PgPool;

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_user(r: &PgRow) -> UserRow {
    UserRow {
        id: r.get("id"),
        username: r.get("username"),
        email: r.try_get("email").ok(),
        password_hash: r.try_get("password_hash").ok(),
        email_verified: r.get("email_verified"),
        is_active: r.get("is_active"),
        is_admin: r.get("is_admin"),
        created_at: r.get("created_at"),
        last_login: r.try_get("last_login").ok(),
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(
        &self,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
        is_admin: bool,
        email_verified: bool,
    ) -> anyhow::Result<UserRow> {
        let row = sqlx::query(
            r#"INSERT INTO users (username, email, password_hash, is_admin, email_verified)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, username, email, password_hash, email_verified, is_active, is_admin,
                         created_at, last_login"#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(is_admin)
        .bind(email_verified)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_user(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"SELECT id, username, email, password_hash, email_verified, is_active, is_admin,
                      created_at, last_login
               FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_user(&r)))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"SELECT id, username, email, password_hash, email_verified, is_active, is_admin,
                      created_at, last_login
               FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_user(&r)))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"SELECT id, username, email, password_hash, email_verified, is_active, is_admin,
                      created_at, last_login
               FROM users WHERE lower(email) = lower($1)"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_user(&r)))
    }

    async fn touch_last_login(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_email_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users SET email_token = $2, email_token_expires_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_email_token(&self, token: &str) -> anyhow::Result<Option<TokenLookup>> {
        let row = sqlx::query(
            r#"SELECT id, username, email, password_hash, email_verified, is_active, is_admin,
                      created_at, last_login, email_token_expires_at
               FROM users WHERE email_token = $1"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| TokenLookup {
            expires_at: r.get("email_token_expires_at"),
            user: map_user(&r),
        }))
    }

    async fn mark_email_verified(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE users
               SET email_verified = TRUE, email_token = NULL, email_token_expires_at = NULL
               WHERE id = $1"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users SET reset_token = $2, reset_token_expires_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_reset_token(&self, token: &str) -> anyhow::Result<Option<TokenLookup>> {
        let row = sqlx::query(
            r#"SELECT id, username, email, password_hash, email_verified, is_active, is_admin,
                      created_at, last_login, reset_token_expires_at
               FROM users WHERE reset_token = $1"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| TokenLookup {
            expires_at: r.get("reset_token_expires_at"),
            user: map_user(&r),
        }))
    }

    async fn reset_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE users
               SET password_hash = $2, reset_token = NULL, reset_token_expires_at = NULL
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn promote_admin(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET is_admin = TRUE WHERE id = $1 AND NOT is_admin")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"UPDATE users SET is_active = $2 WHERE id = $1
               RETURNING id, username, email, password_hash, email_verified, is_active, is_admin,
                         created_at, last_login"#,
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_user(&r)))
    }

    async fn list_users(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<UserRow>> {
        let rows = sqlx::query(
            r#"SELECT id, username, email, password_hash, email_verified, is_active, is_admin,
                      created_at, last_login
               FROM users ORDER BY created_at ASC LIMIT $1 OFFSET $2"#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_user).collect())
    }
}

use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::passkey_repository::{PasskeyRepository, PasskeyRow};
use crate::infrastructure::db::PgPool;

/// Credentials live on the users table; one slot per user.
pub struct SqlxPasskeyRepository {
    pub pool: PgPool,
}

impl SqlxPasskeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PasskeyRepository for SqlxPasskeyRepository {
    async fn save(
        &self,
        user_id: Uuid,
        credential: &serde_json::Value,
        credential_id: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE users
               SET passkey = $2, passkey_credential_id = $3, passkey_sign_count = 0,
                   passkey_registered_at = now()
               WHERE id = $1"#,
        )
        .bind(user_id)
        .bind(credential)
        .bind(credential_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_for_user(&self, user_id: Uuid) -> anyhow::Result<Option<PasskeyRow>> {
        let row = sqlx::query(
            r#"SELECT id, passkey, passkey_credential_id, passkey_sign_count,
                      passkey_registered_at
               FROM users WHERE id = $1 AND passkey IS NOT NULL"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| PasskeyRow {
            user_id: r.get("id"),
            credential: r.get("passkey"),
            credential_id: r.get("passkey_credential_id"),
            sign_count: r.get("passkey_sign_count"),
            registered_at: r.get("passkey_registered_at"),
        }))
    }

    async fn update_credential(
        &self,
        user_id: Uuid,
        credential: &serde_json::Value,
        sign_count: i64,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET passkey = $2, passkey_sign_count = $3 WHERE id = $1")
            .bind(user_id)
            .bind(credential)
            .bind(sign_count)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE users
               SET passkey = NULL, passkey_credential_id = NULL, passkey_sign_count = 0,
                   passkey_registered_at = NULL
               WHERE id = $1 AND passkey IS NOT NULL"#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}

use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::minigame_repository::{MinigameProgressRow, MinigameRepository};
use crate::infrastructure::db::PgPool;

pub struct SqlxMinigameRepository {
    pub pool: PgPool,
}

impl SqlxMinigameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MinigameRepository for SqlxMinigameRepository {
    async fn mark_completed(
        &self,
        user_id: Uuid,
        challenge_id: &str,
        minigame: &str,
        part_index: i32,
        revealed_part: &str,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"INSERT INTO minigame_progress (user_id, challenge_id, minigame, part_index, revealed_part)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (user_id, challenge_id, minigame) DO NOTHING"#,
        )
        .bind(user_id)
        .bind(challenge_id)
        .bind(minigame)
        .bind(part_index)
        .bind(revealed_part)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn progress_for(
        &self,
        user_id: Uuid,
        challenge_id: &str,
    ) -> anyhow::Result<Vec<MinigameProgressRow>> {
        let rows = sqlx::query(
            r#"SELECT minigame, part_index, revealed_part, completed_at FROM minigame_progress
               WHERE user_id = $1 AND challenge_id = $2 ORDER BY part_index ASC"#,
        )
        .bind(user_id)
        .bind(challenge_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| MinigameProgressRow {
                minigame: r.get("minigame"),
                part_index: r.get("part_index"),
                revealed_part: r.get("revealed_part"),
                completed_at: r.get("completed_at"),
            })
            .collect())
    }

    async fn has_completed(
        &self,
        user_id: Uuid,
        challenge_id: &str,
        minigame: &str,
    ) -> anyhow::Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            r#"SELECT 1::bigint FROM minigame_progress
               WHERE user_id = $1 AND challenge_id = $2 AND minigame = $3"#,
        )
        .bind(user_id)
        .bind(challenge_id)
        .bind(minigame)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }
}

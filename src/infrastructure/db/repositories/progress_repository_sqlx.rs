use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::progress_repository::{ProgressRepository, SolveRow};
use crate::infrastructure::db::PgPool;

pub struct SqlxProgressRepository {
    pub pool: PgPool,
}

impl SqlxProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressRepository for SqlxProgressRepository {
    async fn record_solve(&self, user_id: Uuid, challenge_id: &str) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"INSERT INTO challenge_solves (user_id, challenge_id) VALUES ($1, $2)
               ON CONFLICT (user_id, challenge_id) DO NOTHING"#,
        )
        .bind(user_id)
        .bind(challenge_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn has_solved(&self, user_id: Uuid, challenge_id: &str) -> anyhow::Result<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1::bigint FROM challenge_solves WHERE user_id = $1 AND challenge_id = $2",
        )
        .bind(user_id)
        .bind(challenge_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }

    async fn solves_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<SolveRow>> {
        let rows = sqlx::query(
            r#"SELECT challenge_id, solved_at FROM challenge_solves
               WHERE user_id = $1 ORDER BY solved_at ASC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| SolveRow {
                challenge_id: r.get("challenge_id"),
                solved_at: r.get("solved_at"),
            })
            .collect())
    }

    async fn count_solves_by_difficulty(
        &self,
        user_id: Uuid,
        difficulty: &str,
    ) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT count(*) FROM challenge_solves s
               JOIN challenges c ON c.id = s.challenge_id
               WHERE s.user_id = $1 AND c.difficulty = $2"#,
        )
        .bind(user_id)
        .bind(difficulty)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn score_for_user(&self, user_id: Uuid) -> anyhow::Result<i64> {
        let score: i64 = sqlx::query_scalar(
            r#"SELECT COALESCE(SUM(c.points), 0)::bigint FROM challenge_solves s
               JOIN challenges c ON c.id = s.challenge_id
               WHERE s.user_id = $1"#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(score)
    }

    async fn hints_used(&self, user_id: Uuid, challenge_id: &str) -> anyhow::Result<i32> {
        let used: Option<i32> = sqlx::query_scalar(
            "SELECT hints_used FROM hint_usage WHERE user_id = $1 AND challenge_id = $2",
        )
        .bind(user_id)
        .bind(challenge_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(used.unwrap_or(0))
    }

    async fn record_hint(&self, user_id: Uuid, challenge_id: &str) -> anyhow::Result<i32> {
        let used: i32 = sqlx::query_scalar(
            r#"INSERT INTO hint_usage (user_id, challenge_id, hints_used) VALUES ($1, $2, 1)
               ON CONFLICT (user_id, challenge_id)
               DO UPDATE SET hints_used = hint_usage.hints_used + 1
               RETURNING hints_used"#,
        )
        .bind(user_id)
        .bind(challenge_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(used)
    }
}

use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::application::ports::challenge_repository::{
    ChallengeRepository, ChallengeRow, NewChallenge,
};
use crate::infrastructure::db::PgPool;

pub struct SqlxChallengeRepository {
    pub pool: PgPool,
}

impl SqlxChallengeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_challenge(r: &PgRow) -> ChallengeRow {
    let hints: serde_json::Value = r.get("hints");
    ChallengeRow {
        id: r.get("id"),
        kind: r.get("kind"),
        difficulty: r.get("difficulty"),
        category: r.get("category"),
        description: r.get("description"),
        points: r.get("points"),
        hints: serde_json::from_value(hints).unwrap_or_default(),
        encrypted_message: r.get("encrypted_message"),
        flag: r.get("flag"),
        is_active: r.get("is_active"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl ChallengeRepository for SqlxChallengeRepository {
    async fn insert(&self, challenge: &NewChallenge) -> anyhow::Result<ChallengeRow> {
        let hints = serde_json::to_value(&challenge.hints)?;
        let row = sqlx::query(
            r#"INSERT INTO challenges (id, kind, difficulty, category, description, points, hints,
                                       encrypted_message, flag)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING id, kind, difficulty, category, description, points, hints,
                         encrypted_message, flag, is_active, created_at"#,
        )
        .bind(&challenge.id)
        .bind(&challenge.kind)
        .bind(&challenge.difficulty)
        .bind(&challenge.category)
        .bind(&challenge.description)
        .bind(challenge.points)
        .bind(hints)
        .bind(&challenge.encrypted_message)
        .bind(&challenge.flag)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_challenge(&row))
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<ChallengeRow>> {
        let row = sqlx::query(
            r#"SELECT id, kind, difficulty, category, description, points, hints,
                      encrypted_message, flag, is_active, created_at
               FROM challenges WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_challenge(&r)))
    }

    async fn exists(&self, id: &str) -> anyhow::Result<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1::bigint FROM challenges WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    async fn list_active(&self) -> anyhow::Result<Vec<ChallengeRow>> {
        let rows = sqlx::query(
            r#"SELECT id, kind, difficulty, category, description, points, hints,
                      encrypted_message, flag, is_active, created_at
               FROM challenges WHERE is_active ORDER BY points ASC, id ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_challenge).collect())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<ChallengeRow>> {
        let rows = sqlx::query(
            r#"SELECT id, kind, difficulty, category, description, points, hints,
                      encrypted_message, flag, is_active, created_at
               FROM challenges ORDER BY created_at ASC, id ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_challenge).collect())
    }

    async fn set_active(&self, id: &str, active: bool) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE challenges SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SolveRow {
    pub challenge_id: String,
    pub solved_at: DateTime<Utc>,
}

/// Solve and hint bookkeeping per user and challenge.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Records a solve; returns false when the challenge was already solved.
    async fn record_solve(&self, user_id: Uuid, challenge_id: &str) -> anyhow::Result<bool>;
    async fn has_solved(&self, user_id: Uuid, challenge_id: &str) -> anyhow::Result<bool>;
    async fn solves_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<SolveRow>>;
    async fn count_solves_by_difficulty(
        &self,
        user_id: Uuid,
        difficulty: &str,
    ) -> anyhow::Result<i64>;
    /// Total points across solved challenges.
    async fn score_for_user(&self, user_id: Uuid) -> anyhow::Result<i64>;
    async fn hints_used(&self, user_id: Uuid, challenge_id: &str) -> anyhow::Result<i32>;
    /// Bumps the hint counter and returns the new value.
    async fn record_hint(&self, user_id: Uuid, challenge_id: &str) -> anyhow::Result<i32>;
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MinigameProgressRow {
    pub minigame: String,
    pub part_index: i32,
    pub revealed_part: String,
    pub completed_at: DateTime<Utc>,
}

#[async_trait]
pub trait MinigameRepository: Send + Sync {
    /// Marks a game completed for the user on a challenge. Idempotent:
    /// returns false when the game was already recorded.
    async fn mark_completed(
        &self,
        user_id: Uuid,
        challenge_id: &str,
        minigame: &str,
        part_index: i32,
        revealed_part: &str,
    ) -> anyhow::Result<bool>;
    async fn progress_for(
        &self,
        user_id: Uuid,
        challenge_id: &str,
    ) -> anyhow::Result<Vec<MinigameProgressRow>>;
    async fn has_completed(
        &self,
        user_id: Uuid,
        challenge_id: &str,
        minigame: &str,
    ) -> anyhow::Result<bool>;
}

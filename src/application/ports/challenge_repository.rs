use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct ChallengeRow {
    pub id: String,
    pub kind: String,
    pub difficulty: String,
    pub category: String,
    pub description: String,
    pub points: i32,
    pub hints: Vec<String>,
    pub encrypted_message: String,
    pub flag: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChallenge {
    pub id: String,
    pub kind: String,
    pub difficulty: String,
    pub category: String,
    pub description: String,
    pub points: i32,
    pub hints: Vec<String>,
    pub encrypted_message: String,
    pub flag: String,
}

#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    async fn insert(&self, challenge: &NewChallenge) -> anyhow::Result<ChallengeRow>;
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<ChallengeRow>>;
    async fn exists(&self, id: &str) -> anyhow::Result<bool>;
    async fn list_active(&self) -> anyhow::Result<Vec<ChallengeRow>>;
    async fn list_all(&self) -> anyhow::Result<Vec<ChallengeRow>>;
    async fn set_active(&self, id: &str, active: bool) -> anyhow::Result<bool>;
}

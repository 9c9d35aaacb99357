use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// One inbox line: the latest message exchanged with a peer plus the
/// number of their messages still unread.
#[derive(Debug, Clone)]
pub struct ConversationRow {
    pub peer_id: Uuid,
    pub peer_username: String,
    pub last_message: String,
    pub last_at: DateTime<Utc>,
    pub unread: i64,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn send(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        body: &str,
    ) -> anyhow::Result<MessageRow>;
    async fn conversations_for(&self, user_id: Uuid) -> anyhow::Result<Vec<ConversationRow>>;
    /// Full two-way thread between the user and a peer, oldest first.
    async fn thread(&self, user_id: Uuid, peer_id: Uuid) -> anyhow::Result<Vec<MessageRow>>;
    /// Marks the peer's messages to the user read; returns how many changed.
    async fn mark_read(&self, user_id: Uuid, peer_id: Uuid) -> anyhow::Result<u64>;
    async fn unread_count(&self, user_id: Uuid) -> anyhow::Result<i64>;
}

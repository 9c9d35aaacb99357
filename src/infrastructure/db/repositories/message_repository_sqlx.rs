use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::message_repository::{
    ConversationRow, MessageRepository, MessageRow,
};
use crate::infrastructure::db::PgPool;

pub struct SqlxMessageRepository {
    pub pool: PgPool,
}

impl SqlxMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_message(r: &PgRow) -> MessageRow {
    MessageRow {
        id: r.get("id"),
        sender_id: r.get("sender_id"),
        recipient_id: r.get("recipient_id"),
        body: r.get("body"),
        is_read: r.get("is_read"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl MessageRepository for SqlxMessageRepository {
    async fn send(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        body: &str,
    ) -> anyhow::Result<MessageRow> {
        let row = sqlx::query(
            r#"INSERT INTO messages (sender_id, recipient_id, body) VALUES ($1, $2, $3)
               RETURNING id, sender_id, recipient_id, body, is_read, created_at"#,
        )
        .bind(sender_id)
        .bind(recipient_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_message(&row))
    }

    async fn conversations_for(&self, user_id: Uuid) -> anyhow::Result<Vec<ConversationRow>> {
        let rows = sqlx::query(
            r#"WITH convo AS (
                   SELECT CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END AS peer_id,
                          body, created_at
                   FROM messages
                   WHERE sender_id = $1 OR recipient_id = $1
               ), latest AS (
                   SELECT DISTINCT ON (peer_id) peer_id, body, created_at
                   FROM convo
                   ORDER BY peer_id, created_at DESC
               )
               SELECT l.peer_id, u.username AS peer_username, l.body AS last_message,
                      l.created_at AS last_at, COALESCE(un.unread, 0) AS unread
               FROM latest l
               JOIN users u ON u.id = l.peer_id
               LEFT JOIN (
                   SELECT sender_id, count(*) AS unread
                   FROM messages
                   WHERE recipient_id = $1 AND NOT is_read
                   GROUP BY sender_id
               ) un ON un.sender_id = l.peer_id
               ORDER BY l.created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| ConversationRow {
                peer_id: r.get("peer_id"),
                peer_username: r.get("peer_username"),
                last_message: r.get("last_message"),
                last_at: r.get("last_at"),
                unread: r.get("unread"),
            })
            .collect())
    }

    async fn thread(&self, user_id: Uuid, peer_id: Uuid) -> anyhow::Result<Vec<MessageRow>> {
        let rows = sqlx::query(
            r#"SELECT id, sender_id, recipient_id, body, is_read, created_at
               FROM messages
               WHERE (sender_id = $1 AND recipient_id = $2)
                  OR (sender_id = $2 AND recipient_id = $1)
               ORDER BY created_at ASC"#,
        )
        .bind(user_id)
        .bind(peer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(map_message).collect())
    }

    async fn mark_read(&self, user_id: Uuid, peer_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"UPDATE messages SET is_read = TRUE
               WHERE recipient_id = $1 AND sender_id = $2 AND NOT is_read"#,
        )
        .bind(user_id)
        .bind(peer_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    async fn unread_count(&self, user_id: Uuid) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM messages WHERE recipient_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

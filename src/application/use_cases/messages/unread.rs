use uuid::Uuid;

use crate::application::ports::message_repository::MessageRepository;

pub struct UnreadCount<'a, M: MessageRepository + ?Sized> {
    pub messages: &'a M,
}

impl<'a, M: MessageRepository + ?Sized> UnreadCount<'a, M> {
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<i64> {
        self.messages.unread_count(user_id).await
    }
}

use uuid::Uuid;

use crate::application::ports::message_repository::{ConversationRow, MessageRepository};

pub struct Conversations<'a, M: MessageRepository + ?Sized> {
    pub messages: &'a M,
}

impl<'a, M: MessageRepository + ?Sized> Conversations<'a, M> {
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<Vec<ConversationRow>> {
        self.messages.conversations_for(user_id).await
    }
}

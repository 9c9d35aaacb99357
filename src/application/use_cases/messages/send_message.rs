use uuid::Uuid;

use crate::application::ports::message_repository::{MessageRepository, MessageRow};
use crate::application::ports::user_repository::UserRepository;

pub struct SendMessage<'a, U, M>
where
    U: UserRepository + ?Sized,
    M: MessageRepository + ?Sized,
{
    pub users: &'a U,
    pub messages: &'a M,
}

#[derive(Debug)]
pub enum SendMessageOutcome {
    Sent(MessageRow),
    UnknownPeer,
    SelfMessage,
    EmptyContent,
}

impl<'a, U, M> SendMessage<'a, U, M>
where
    U: UserRepository + ?Sized,
    M: MessageRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        peer_username: &str,
        content: &str,
    ) -> anyhow::Result<SendMessageOutcome> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(SendMessageOutcome::EmptyContent);
        }
        let peer = match self.users.find_by_username(peer_username.trim()).await? {
            Some(u) => u,
            None => return Ok(SendMessageOutcome::UnknownPeer),
        };
        if peer.id == user_id {
            return Ok(SendMessageOutcome::SelfMessage);
        }
        let row = self.messages.send(user_id, peer.id, content).await?;
        Ok(SendMessageOutcome::Sent(row))
    }
}

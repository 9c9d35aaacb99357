use uuid::Uuid;

use crate::application::ports::message_repository::{MessageRepository, MessageRow};
use crate::application::ports::user_repository::UserRepository;

pub struct GetThread<'a, U, M>
where
    U: UserRepository + ?Sized,
    M: MessageRepository + ?Sized,
{
    pub users: &'a U,
    pub messages: &'a M,
}

#[derive(Debug)]
pub struct ThreadView {
    pub peer_id: Uuid,
    pub peer_username: String,
    pub messages: Vec<MessageRow>,
}

#[derive(Debug)]
pub enum GetThreadOutcome {
    Thread(ThreadView),
    UnknownPeer,
    SelfThread,
}

impl<'a, U, M> GetThread<'a, U, M>
where
    U: UserRepository + ?Sized,
    M: MessageRepository + ?Sized,
{
    /// Opening a thread marks the peer's unread messages as read.
    pub async fn execute(
        &self,
        user_id: Uuid,
        peer_username: &str,
    ) -> anyhow::Result<GetThreadOutcome> {
        let peer = match self.users.find_by_username(peer_username.trim()).await? {
            Some(u) => u,
            None => return Ok(GetThreadOutcome::UnknownPeer),
        };
        if peer.id == user_id {
            return Ok(GetThreadOutcome::SelfThread);
        }
        self.messages.mark_read(user_id, peer.id).await?;
        let messages = self.messages.thread(user_id, peer.id).await?;
        Ok(GetThreadOutcome::Thread(ThreadView {
            peer_id: peer.id,
            peer_username: peer.username,
            messages,
        }))
    }
}

use uuid::Uuid;

use crate::application::ports::challenge_repository::{ChallengeRepository, ChallengeRow};
use crate::application::ports::minigame_repository::MinigameRepository;
use crate::application::services::minigames::split_key;
use crate::domain::challenges::challenge::LayeredMessage;
use crate::domain::challenges::minigame::Minigame;

pub struct MinigameOverview<'a, C, M>
where
    C: ChallengeRepository + ?Sized,
    M: MinigameRepository + ?Sized,
{
    pub challenges: &'a C,
    pub minigames: &'a M,
}

#[derive(Debug)]
pub struct OverviewItem {
    pub challenge: ChallengeRow,
    /// Games holding a slice of this challenge's key, in deal order.
    pub games: Vec<Minigame>,
    pub completed: usize,
}

impl<'a, C, M> MinigameOverview<'a, C, M>
where
    C: ChallengeRepository + ?Sized,
    M: MinigameRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> anyhow::Result<Vec<OverviewItem>> {
        let mut items = Vec::new();
        for challenge in self.challenges.list_active().await? {
            // Rows without a parseable layered message cannot be played.
            let Some(layered) = LayeredMessage::parse(&challenge.encrypted_message) else {
                continue;
            };
            let games: Vec<Minigame> = split_key(&layered.key)
                .iter()
                .map(|p| p.game)
                .collect();
            let completed = self
                .minigames
                .progress_for(user_id, &challenge.id)
                .await?
                .len();
            items.push(OverviewItem {
                challenge,
                games,
                completed,
            });
        }
        Ok(items)
    }
}

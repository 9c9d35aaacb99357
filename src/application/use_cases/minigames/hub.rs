use std::collections::HashSet;

use anyhow::Context;
use uuid::Uuid;

use crate::application::ports::challenge_repository::{ChallengeRepository, ChallengeRow};
use crate::application::ports::minigame_repository::MinigameRepository;
use crate::application::services::minigames::{revealed_key, split_key};
use crate::domain::challenges::challenge::LayeredMessage;
use crate::domain::challenges::minigame::Minigame;

pub struct MinigameHub<'a, C, M>
where
    C: ChallengeRepository + ?Sized,
    M: MinigameRepository + ?Sized,
{
    pub challenges: &'a C,
    pub minigames: &'a M,
}

#[derive(Debug)]
pub struct PartStatus {
    pub game: Minigame,
    pub length: usize,
    pub revealed: bool,
    /// The slice itself, present only once its game is completed.
    pub value: Option<String>,
}

#[derive(Debug)]
pub struct HubView {
    pub challenge: ChallengeRow,
    pub parts: Vec<PartStatus>,
    pub masked_key: String,
    pub completed: usize,
    pub key_complete: bool,
}

impl<'a, C, M> MinigameHub<'a, C, M>
where
    C: ChallengeRepository + ?Sized,
    M: MinigameRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        challenge_id: &str,
    ) -> anyhow::Result<Option<HubView>> {
        let challenge = match self.challenges.find_by_id(challenge_id).await? {
            Some(c) if c.is_active => c,
            _ => return Ok(None),
        };
        let layered = LayeredMessage::parse(&challenge.encrypted_message)
            .with_context(|| format!("challenge {} has a malformed message", challenge.id))?;
        let parts = split_key(&layered.key);

        let completed: HashSet<Minigame> = self
            .minigames
            .progress_for(user_id, &challenge.id)
            .await?
            .iter()
            .filter_map(|row| Minigame::parse(&row.minigame))
            .collect();

        let masked_key = revealed_key(&parts, &completed);
        let statuses: Vec<PartStatus> = parts
            .iter()
            .map(|p| {
                let revealed = completed.contains(&p.game);
                PartStatus {
                    game: p.game,
                    length: p.value.chars().count(),
                    revealed,
                    value: revealed.then(|| p.value.clone()),
                }
            })
            .collect();
        let key_complete = statuses.iter().all(|s| s.revealed);

        Ok(Some(HubView {
            challenge,
            completed: completed.len(),
            parts: statuses,
            masked_key,
            key_complete,
        }))
    }
}

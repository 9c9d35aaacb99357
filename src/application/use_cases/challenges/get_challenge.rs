use uuid::Uuid;

use crate::application::ports::challenge_repository::{ChallengeRepository, ChallengeRow};
use crate::application::ports::progress_repository::ProgressRepository;

pub struct GetChallenge<'a, C, P>
where
    C: ChallengeRepository + ?Sized,
    P: ProgressRepository + ?Sized,
{
    pub challenges: &'a C,
    pub progress: &'a P,
}

#[derive(Debug)]
pub struct ChallengeDetail {
    pub challenge: ChallengeRow,
    pub solved: bool,
    /// Hint bodies the user has already paid for, in reveal order.
    pub hints_revealed: Vec<String>,
    pub hints_total: usize,
}

impl<'a, C, P> GetChallenge<'a, C, P>
where
    C: ChallengeRepository + ?Sized,
    P: ProgressRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        challenge_id: &str,
    ) -> anyhow::Result<Option<ChallengeDetail>> {
        let challenge = match self.challenges.find_by_id(challenge_id).await? {
            Some(c) if c.is_active => c,
            _ => return Ok(None),
        };
        let solved = self.progress.has_solved(user_id, &challenge.id).await?;
        let used = self.progress.hints_used(user_id, &challenge.id).await?;
        let hints_total = challenge.hints.len();
        let upto = (used.max(0) as usize).min(hints_total);
        let hints_revealed = challenge.hints[..upto].to_vec();
        Ok(Some(ChallengeDetail {
            challenge,
            solved,
            hints_revealed,
            hints_total,
        }))
    }
}

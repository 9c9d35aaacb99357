use uuid::Uuid;

use crate::application::ports::challenge_repository::ChallengeRepository;
use crate::application::ports::progress_repository::ProgressRepository;

pub struct TakeHint<'a, C, P>
where
    C: ChallengeRepository + ?Sized,
    P: ProgressRepository + ?Sized,
{
    pub challenges: &'a C,
    pub progress: &'a P,
}

#[derive(Debug)]
pub enum TakeHintOutcome {
    NotFound,
    /// All hints for the challenge have already been handed out.
    Exhausted { total: usize },
    Revealed {
        hint: String,
        used: i32,
        total: usize,
    },
}

impl<'a, C, P> TakeHint<'a, C, P>
where
    C: ChallengeRepository + ?Sized,
    P: ProgressRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        challenge_id: &str,
    ) -> anyhow::Result<TakeHintOutcome> {
        let challenge = match self.challenges.find_by_id(challenge_id).await? {
            Some(c) if c.is_active => c,
            _ => return Ok(TakeHintOutcome::NotFound),
        };
        let total = challenge.hints.len();
        let used = self.progress.hints_used(user_id, &challenge.id).await?;
        if used.max(0) as usize >= total {
            return Ok(TakeHintOutcome::Exhausted { total });
        }
        let used = self.progress.record_hint(user_id, &challenge.id).await?;
        // A concurrent request can race the counter past the end.
        match challenge.hints.get(used as usize - 1) {
            Some(hint) => Ok(TakeHintOutcome::Revealed {
                hint: hint.clone(),
                used,
                total,
            }),
            None => Ok(TakeHintOutcome::Exhausted { total }),
        }
    }
}

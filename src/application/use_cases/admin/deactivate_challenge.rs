use crate::application::ports::challenge_repository::ChallengeRepository;

/// Deactivation instead of deletion keeps solves and minigame progress.
pub struct DeactivateChallenge<'a, C: ChallengeRepository + ?Sized> {
    pub challenges: &'a C,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeactivateChallengeOutcome {
    Deactivated,
    NotFound,
}

impl<'a, C: ChallengeRepository + ?Sized> DeactivateChallenge<'a, C> {
    pub async fn execute(&self, challenge_id: &str) -> anyhow::Result<DeactivateChallengeOutcome> {
        if self.challenges.set_active(challenge_id, false).await? {
            Ok(DeactivateChallengeOutcome::Deactivated)
        } else {
            Ok(DeactivateChallengeOutcome::NotFound)
        }
    }
}

use std::collections::HashSet;

use uuid::Uuid;

use crate::application::ports::challenge_repository::{ChallengeRepository, ChallengeRow};
use crate::application::ports::progress_repository::ProgressRepository;
use crate::domain::marketplace::verification::{VerificationProgress, VerificationTier};

/// Standing toward a tier: the qualifying challenges with solve markers
/// plus the derived counts. Works whether or not a profile exists yet.
pub struct TierVerification<'a, C, P>
where
    C: ChallengeRepository + ?Sized,
    P: ProgressRepository + ?Sized,
{
    pub challenges: &'a C,
    pub progress: &'a P,
}

#[derive(Debug)]
pub struct TierChallengeStatus {
    pub challenge: ChallengeRow,
    pub solved: bool,
}

#[derive(Debug)]
pub struct VerificationView {
    pub tier: VerificationTier,
    pub progress: VerificationProgress,
    pub challenges: Vec<TierChallengeStatus>,
}

impl<'a, C, P> TierVerification<'a, C, P>
where
    C: ChallengeRepository + ?Sized,
    P: ProgressRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        tier: VerificationTier,
        required: i64,
    ) -> anyhow::Result<VerificationView> {
        let difficulty = tier.difficulty().as_str();
        let solved: HashSet<String> = self
            .progress
            .solves_for_user(user_id)
            .await?
            .into_iter()
            .map(|s| s.challenge_id)
            .collect();
        let challenges: Vec<TierChallengeStatus> = self
            .challenges
            .list_active()
            .await?
            .into_iter()
            .filter(|c| c.difficulty == difficulty)
            .map(|challenge| TierChallengeStatus {
                solved: solved.contains(&challenge.id),
                challenge,
            })
            .collect();
        let progress = VerificationProgress {
            solved: self
                .progress
                .count_solves_by_difficulty(user_id, difficulty)
                .await?,
            required,
        };
        Ok(VerificationView {
            tier,
            progress,
            challenges,
        })
    }
}

use uuid::Uuid;

use crate::application::ports::challenge_repository::ChallengeRepository;
use crate::application::ports::progress_repository::ProgressRepository;
use crate::application::services::challenges::flags_match;
use crate::domain::marketplace::verification::{VerificationProgress, VerificationTier};

pub struct SubmitFlag<'a, C, P>
where
    C: ChallengeRepository + ?Sized,
    P: ProgressRepository + ?Sized,
{
    pub challenges: &'a C,
    pub progress: &'a P,
}

#[derive(Debug)]
pub struct TierStanding {
    pub tier: VerificationTier,
    pub progress: VerificationProgress,
    /// True only on the submission that reached the threshold.
    pub just_verified: bool,
}

#[derive(Debug)]
pub enum SubmitFlagOutcome {
    NotFound,
    Incorrect,
    Correct {
        already_solved: bool,
        points: i32,
        standing: Option<TierStanding>,
    },
}

impl<'a, C, P> SubmitFlag<'a, C, P>
where
    C: ChallengeRepository + ?Sized,
    P: ProgressRepository + ?Sized,
{
    /// `required_for_mode` is the tier threshold matching `mode`.
    pub async fn execute(
        &self,
        user_id: Uuid,
        challenge_id: &str,
        flag: &str,
        mode: Option<VerificationTier>,
        required_for_mode: i64,
    ) -> anyhow::Result<SubmitFlagOutcome> {
        let challenge = match self.challenges.find_by_id(challenge_id).await? {
            Some(c) if c.is_active => c,
            _ => return Ok(SubmitFlagOutcome::NotFound),
        };
        if !flags_match(flag, &challenge.flag) {
            return Ok(SubmitFlagOutcome::Incorrect);
        }

        let newly_recorded = self.progress.record_solve(user_id, &challenge.id).await?;

        // Tier standing is only reported when the submission was made in a
        // verification mode and the challenge counts toward that tier.
        let mut standing = None;
        if let Some(tier) = mode {
            if challenge.difficulty == tier.difficulty().as_str() {
                let progress = VerificationProgress {
                    solved: self
                        .progress
                        .count_solves_by_difficulty(user_id, tier.difficulty().as_str())
                        .await?,
                    required: required_for_mode,
                };
                standing = Some(TierStanding {
                    tier,
                    just_verified: newly_recorded && progress.just_crossed(),
                    progress,
                });
            }
        }

        Ok(SubmitFlagOutcome::Correct {
            already_solved: !newly_recorded,
            points: challenge.points,
            standing,
        })
    }
}

use std::collections::HashSet;

use uuid::Uuid;

use crate::application::ports::challenge_repository::{ChallengeRepository, ChallengeRow};
use crate::application::ports::progress_repository::ProgressRepository;
use crate::domain::marketplace::verification::{VerificationProgress, VerificationTier};

pub struct ListChallenges<'a, C, P>
where
    C: ChallengeRepository + ?Sized,
    P: ProgressRepository + ?Sized,
{
    pub challenges: &'a C,
    pub progress: &'a P,
}

#[derive(Debug, Clone, Default)]
pub struct ChallengeFilter {
    pub difficulty: Option<String>,
    pub category: Option<String>,
    /// Narrows the list to the tier's difficulty and reports progress.
    pub mode: Option<VerificationTier>,
}

#[derive(Debug)]
pub struct ListedChallenge {
    pub challenge: ChallengeRow,
    pub solved: bool,
}

#[derive(Debug)]
pub struct ChallengeList {
    pub challenges: Vec<ListedChallenge>,
    pub verification: Option<VerificationProgress>,
}

impl<'a, C, P> ListChallenges<'a, C, P>
where
    C: ChallengeRepository + ?Sized,
    P: ProgressRepository + ?Sized,
{
    /// `required_for_mode` is the solve threshold for `filter.mode`;
    /// it is ignored when no mode was requested.
    pub async fn execute(
        &self,
        user_id: Uuid,
        filter: &ChallengeFilter,
        required_for_mode: i64,
    ) -> anyhow::Result<ChallengeList> {
        let mut rows = self.challenges.list_active().await?;
        if let Some(tier) = filter.mode {
            let difficulty = tier.difficulty().as_str();
            rows.retain(|c| c.difficulty == difficulty);
        }
        if let Some(d) = &filter.difficulty {
            rows.retain(|c| c.difficulty.eq_ignore_ascii_case(d));
        }
        if let Some(cat) = &filter.category {
            rows.retain(|c| c.category.eq_ignore_ascii_case(cat));
        }

        let solved: HashSet<String> = self
            .progress
            .solves_for_user(user_id)
            .await?
            .into_iter()
            .map(|s| s.challenge_id)
            .collect();
        let verification = match filter.mode {
            Some(tier) => Some(VerificationProgress {
                solved: self
                    .progress
                    .count_solves_by_difficulty(user_id, tier.difficulty().as_str())
                    .await?,
                required: required_for_mode,
            }),
            None => None,
        };

        let challenges = rows
            .into_iter()
            .map(|challenge| ListedChallenge {
                solved: solved.contains(&challenge.id),
                challenge,
            })
            .collect();
        Ok(ChallengeList {
            challenges,
            verification,
        })
    }
}

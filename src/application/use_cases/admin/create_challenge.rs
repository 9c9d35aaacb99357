use crate::application::ports::challenge_repository::{
    ChallengeRepository, ChallengeRow, NewChallenge,
};
use crate::application::services::challenges::generate;
use crate::domain::challenges::challenge::{ChallengeKind, Difficulty};

pub struct CreateChallenge<'a, C: ChallengeRepository + ?Sized> {
    pub challenges: &'a C,
}

#[derive(Debug, Clone)]
pub struct CreateChallengeRequest {
    /// Defaults to `{kind}_{difficulty}` when omitted.
    pub id: Option<String>,
    pub kind: String,
    pub difficulty: String,
    pub category: Option<String>,
}

#[derive(Debug)]
pub enum CreateChallengeOutcome {
    Created(ChallengeRow),
    DuplicateId,
    InvalidInput(&'static str),
}

impl<'a, C: ChallengeRepository + ?Sized> CreateChallenge<'a, C> {
    pub async fn execute(
        &self,
        req: &CreateChallengeRequest,
    ) -> anyhow::Result<CreateChallengeOutcome> {
        let Some(kind) = ChallengeKind::parse(&req.kind) else {
            return Ok(CreateChallengeOutcome::InvalidInput("unknown challenge kind"));
        };
        let Some(difficulty) = Difficulty::parse(&req.difficulty) else {
            return Ok(CreateChallengeOutcome::InvalidInput("unknown difficulty"));
        };
        let id = match req.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => format!("{}_{}", kind.as_str(), difficulty.as_str()),
        };
        if self.challenges.exists(&id).await? {
            return Ok(CreateChallengeOutcome::DuplicateId);
        }
        let generated = generate(kind, difficulty)?;
        let row = self
            .challenges
            .insert(&NewChallenge {
                id,
                kind: kind.as_str().to_string(),
                difficulty: difficulty.as_str().to_string(),
                category: req
                    .category
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .unwrap_or("crypto")
                    .to_string(),
                description: generated.description,
                points: generated.points,
                hints: generated.hints,
                encrypted_message: generated.encrypted_message,
                flag: generated.flag,
            })
            .await?;
        Ok(CreateChallengeOutcome::Created(row))
    }
}

use crate::application::use_cases::challenges::get_challenge::GetChallenge;
use crate::application::use_cases::challenges::list_challenges::{
    ChallengeFilter, ListChallenges,
};
use crate::application::use_cases::challenges::submit_flag::{SubmitFlag, SubmitFlagOutcome};
use crate::application::use_cases::challenges::take_hint::{TakeHint, TakeHintOutcome};
use crate::bootstrap::app_context::AppContext;
use crate::domain::challenges::challenge::LayeredMessage;
use crate::domain::marketplace::verification::{VerificationProgress, VerificationTier};
use crate::application::ports::challenge_repository::ChallengeRow;
use crate::presentation::http::auth::{Bearer, require_user};
use crate::presentation::http::ApiMessage;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    pub difficulty: Option<String>,
    pub category: Option<String>,
    /// `buyer` or `seller`; narrows the list to that tier's difficulty.
    pub mode: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChallengeSummary {
    pub id: String,
    pub kind: String,
    pub difficulty: String,
    pub category: String,
    pub description: String,
    pub points: i32,
    /// Cipher payload only; the recovery key never leaves the server.
    pub ciphertext: String,
    pub hints_total: usize,
    pub solved: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerificationProgressResponse {
    pub solved: i64,
    pub required: i64,
    pub verified: bool,
}

impl From<VerificationProgress> for VerificationProgressResponse {
    fn from(p: VerificationProgress) -> Self {
        Self {
            verified: p.verified(),
            solved: p.solved,
            required: p.required,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChallengeListResponse {
    pub challenges: Vec<ChallengeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationProgressResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChallengeDetailResponse {
    pub id: String,
    pub kind: String,
    pub difficulty: String,
    pub category: String,
    pub description: String,
    pub points: i32,
    pub ciphertext: String,
    pub solved: bool,
    pub hints_revealed: Vec<String>,
    pub hints_total: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitFlagRequest {
    pub flag: String,
    /// `buyer` or `seller` to report verification standing.
    pub mode: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TierStandingResponse {
    pub tier: String,
    pub solved: i64,
    pub required: i64,
    pub verified: bool,
    pub just_verified: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitFlagResponse {
    pub correct: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_solved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<TierStandingResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HintResponse {
    pub hint: Option<String>,
    pub hints_used: usize,
    pub hints_total: usize,
    pub message: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_challenges))
        .route("/:id", get(get_challenge))
        .route("/:id/submit", post(submit_flag))
        .route("/:id/hint", post(take_hint))
        .with_state(ctx)
}

/// Strips the layered envelope so the key segment stays server-side.
fn public_ciphertext(row: &ChallengeRow) -> String {
    match LayeredMessage::parse(&row.encrypted_message) {
        Some(msg) => msg.payload,
        None => row.encrypted_message.clone(),
    }
}

fn required_solves(ctx: &AppContext, tier: VerificationTier) -> i64 {
    match tier {
        VerificationTier::Buyer => ctx.cfg.buyer_required_solves,
        VerificationTier::Seller => ctx.cfg.seller_required_solves,
    }
}

#[utoipa::path(get, path = "/api/challenges", tag = "Challenges",
    params(
        ("difficulty" = Option<String>, Query, description = "Filter by difficulty"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("mode" = Option<String>, Query, description = "buyer or seller verification view")
    ),
    responses((status = 200, body = ChallengeListResponse))
)]
pub async fn list_challenges(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Query(query): Query<ChallengeQuery>,
) -> Result<Json<ChallengeListResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let mode = query.mode.as_deref().and_then(VerificationTier::parse);
    let required = mode.map(|t| required_solves(&ctx, t)).unwrap_or(0);
    let filter = ChallengeFilter {
        difficulty: query.difficulty.clone(),
        category: query.category.clone(),
        mode,
    };
    let challenges = ctx.challenge_repo();
    let progress = ctx.progress_repo();
    let uc = ListChallenges {
        challenges: challenges.as_ref(),
        progress: progress.as_ref(),
    };
    let list = uc
        .execute(user_id, &filter, required)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(ChallengeListResponse {
        challenges: list
            .challenges
            .into_iter()
            .map(|item| ChallengeSummary {
                ciphertext: public_ciphertext(&item.challenge),
                hints_total: item.challenge.hints.len(),
                solved: item.solved,
                id: item.challenge.id,
                kind: item.challenge.kind,
                difficulty: item.challenge.difficulty,
                category: item.challenge.category,
                description: item.challenge.description,
                points: item.challenge.points,
            })
            .collect(),
        verification: list.verification.map(Into::into),
    }))
}

#[utoipa::path(get, path = "/api/challenges/{id}", tag = "Challenges", responses(
    (status = 200, body = ChallengeDetailResponse),
    (status = 404)
))]
pub async fn get_challenge(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(id): Path<String>,
) -> Result<Json<ChallengeDetailResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let challenges = ctx.challenge_repo();
    let progress = ctx.progress_repo();
    let uc = GetChallenge {
        challenges: challenges.as_ref(),
        progress: progress.as_ref(),
    };
    let detail = uc
        .execute(user_id, &id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ChallengeDetailResponse {
        ciphertext: public_ciphertext(&detail.challenge),
        solved: detail.solved,
        hints_revealed: detail.hints_revealed,
        hints_total: detail.hints_total,
        id: detail.challenge.id,
        kind: detail.challenge.kind,
        difficulty: detail.challenge.difficulty,
        category: detail.challenge.category,
        description: detail.challenge.description,
        points: detail.challenge.points,
    }))
}

#[utoipa::path(post, path = "/api/challenges/{id}/submit", tag = "Challenges", request_body = SubmitFlagRequest, responses(
    (status = 200, body = SubmitFlagResponse),
    (status = 404),
    (status = 429, body = ApiMessage)
))]
pub async fn submit_flag(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(id): Path<String>,
    Json(req): Json<SubmitFlagRequest>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let decision = ctx.flag_limiter().check(&format!("{user_id}:flag"));
    if !decision.allowed {
        return Ok((
            StatusCode::TOO_MANY_REQUESTS,
            Json(ApiMessage {
                message: format!(
                    "too many attempts, retry in {} seconds",
                    decision.retry_after_secs
                ),
            }),
        )
            .into_response());
    }

    let mode = req.mode.as_deref().and_then(VerificationTier::parse);
    let required = mode.map(|t| required_solves(&ctx, t)).unwrap_or(0);
    let challenges = ctx.challenge_repo();
    let progress = ctx.progress_repo();
    let uc = SubmitFlag {
        challenges: challenges.as_ref(),
        progress: progress.as_ref(),
    };
    match uc
        .execute(user_id, &id, &req.flag, mode, required)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        SubmitFlagOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        SubmitFlagOutcome::Incorrect => Ok(Json(SubmitFlagResponse {
            correct: false,
            message: "incorrect flag, keep trying".to_string(),
            already_solved: None,
            points: None,
            verification: None,
        })
        .into_response()),
        SubmitFlagOutcome::Correct {
            already_solved,
            points,
            standing,
        } => {
            let message = if already_solved {
                "correct, but you had already solved this one".to_string()
            } else {
                format!("correct! {points} points earned")
            };
            Ok(Json(SubmitFlagResponse {
                correct: true,
                message,
                already_solved: Some(already_solved),
                points: Some(points),
                verification: standing.map(|s| TierStandingResponse {
                    tier: s.tier.as_str().to_string(),
                    solved: s.progress.solved,
                    required: s.progress.required,
                    verified: s.progress.verified(),
                    just_verified: s.just_verified,
                }),
            })
            .into_response())
        }
    }
}

#[utoipa::path(post, path = "/api/challenges/{id}/hint", tag = "Challenges", responses(
    (status = 200, body = HintResponse),
    (status = 404)
))]
pub async fn take_hint(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(id): Path<String>,
) -> Result<Json<HintResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let challenges = ctx.challenge_repo();
    let progress = ctx.progress_repo();
    let uc = TakeHint {
        challenges: challenges.as_ref(),
        progress: progress.as_ref(),
    };
    match uc
        .execute(user_id, &id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        TakeHintOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        TakeHintOutcome::Exhausted { total } => Ok(Json(HintResponse {
            hint: None,
            hints_used: total,
            hints_total: total,
            message: "no hints left for this challenge".to_string(),
        })),
        TakeHintOutcome::Revealed { hint, used, total } => Ok(Json(HintResponse {
            hint: Some(hint),
            hints_used: used.max(0) as usize,
            hints_total: total,
            message: format!("hint {used} of {total}"),
        })),
    }
}

use crate::application::use_cases::minigames::complete_round::{
    CompleteRound, CompleteRoundOutcome, RoundSubmission,
};
use crate::application::use_cases::minigames::hub::MinigameHub;
use crate::application::use_cases::minigames::overview::MinigameOverview;
use crate::application::use_cases::minigames::start_round::{
    RoundContent, StartRound, StartRoundOutcome,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::challenges::minigame::Minigame;
use crate::presentation::http::auth::{Bearer, require_user};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct OverviewEntry {
    pub challenge_id: String,
    pub kind: String,
    pub difficulty: String,
    /// The game lineup in deal order; one key slice per game.
    pub games: Vec<String>,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PartResponse {
    pub game: String,
    pub length: usize,
    pub revealed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HubResponse {
    pub challenge_id: String,
    pub kind: String,
    pub difficulty: String,
    pub parts: Vec<PartResponse>,
    pub masked_key: String,
    pub completed: usize,
    pub key_complete: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WheelSegmentResponse {
    pub label: String,
    pub is_correct: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuizPromptResponse {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemoryCardResponse {
    pub id: String,
    pub value: String,
    pub pair_id: usize,
    pub is_decoy: bool,
}

/// Material for one round; only the fields for the started game are set.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct RoundContentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<WheelSegmentResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuizPromptResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<MemoryCardResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiles: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrambled: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl From<RoundContent> for RoundContentResponse {
    fn from(content: RoundContent) -> Self {
        match content {
            RoundContent::Wheel { segments } => Self {
                segments: Some(
                    segments
                        .into_iter()
                        .map(|s| WheelSegmentResponse {
                            label: s.label.to_string(),
                            is_correct: s.is_correct,
                        })
                        .collect(),
                ),
                ..Self::default()
            },
            RoundContent::Quiz { questions } => Self {
                questions: Some(
                    questions
                        .into_iter()
                        .map(|q| QuizPromptResponse {
                            question: q.question,
                            options: q.options,
                        })
                        .collect(),
                ),
                ..Self::default()
            },
            RoundContent::Memory { cards } => Self {
                cards: Some(
                    cards
                        .into_iter()
                        .map(|c| MemoryCardResponse {
                            id: c.id,
                            value: c.value.to_string(),
                            pair_id: c.pair_id,
                            is_decoy: c.is_decoy,
                        })
                        .collect(),
                ),
                ..Self::default()
            },
            RoundContent::Slider { tiles } => Self {
                tiles: Some(tiles),
                ..Self::default()
            },
            RoundContent::Scramble { scrambled, hint } => Self {
                scrambled: Some(scrambled),
                hint: Some(hint),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StartRoundResponse {
    pub flow_id: Uuid,
    pub game: String,
    pub content: RoundContentResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FlowRequest {
    pub flow_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuizSubmission {
    pub flow_id: Uuid,
    /// Chosen option index per question, in order.
    pub answers: Vec<usize>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SliderSubmission {
    pub flow_id: Uuid,
    pub state: Vec<u8>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScrambleSubmission {
    pub flow_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoundResultResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revealed_part: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_complete: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl RoundResultResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            revealed_part: None,
            part_index: None,
            masked_key: None,
            key_complete: None,
            correct: None,
            total: None,
        }
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(overview))
        .route("/:challenge_id", get(hub))
        .route("/:challenge_id/:game/start", post(start_round))
        .route("/:challenge_id/wheel/complete", post(complete_wheel))
        .route("/:challenge_id/memory/complete", post(complete_memory))
        .route("/:challenge_id/quiz/submit", post(submit_quiz))
        .route("/:challenge_id/slider/submit", post(submit_slider))
        .route("/:challenge_id/scramble/submit", post(submit_scramble))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/minigames", tag = "Minigames", responses(
    (status = 200, body = [OverviewEntry])
))]
pub async fn overview(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Json<Vec<OverviewEntry>>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let challenges = ctx.challenge_repo();
    let minigames = ctx.minigame_repo();
    let uc = MinigameOverview {
        challenges: challenges.as_ref(),
        minigames: minigames.as_ref(),
    };
    let items = uc
        .execute(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(
        items
            .into_iter()
            .map(|item| OverviewEntry {
                challenge_id: item.challenge.id,
                kind: item.challenge.kind,
                difficulty: item.challenge.difficulty,
                total: item.games.len(),
                games: item.games.iter().map(|g| g.as_str().to_string()).collect(),
                completed: item.completed,
            })
            .collect(),
    ))
}

#[utoipa::path(get, path = "/api/minigames/{challenge_id}", tag = "Minigames", responses(
    (status = 200, body = HubResponse),
    (status = 404)
))]
pub async fn hub(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(challenge_id): Path<String>,
) -> Result<Json<HubResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let challenges = ctx.challenge_repo();
    let minigames = ctx.minigame_repo();
    let uc = MinigameHub {
        challenges: challenges.as_ref(),
        minigames: minigames.as_ref(),
    };
    let view = uc
        .execute(user_id, &challenge_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(HubResponse {
        challenge_id: view.challenge.id,
        kind: view.challenge.kind,
        difficulty: view.challenge.difficulty,
        parts: view
            .parts
            .into_iter()
            .map(|p| PartResponse {
                game: p.game.as_str().to_string(),
                length: p.length,
                revealed: p.revealed,
                value: p.value,
            })
            .collect(),
        masked_key: view.masked_key,
        completed: view.completed,
        key_complete: view.key_complete,
    }))
}

#[utoipa::path(post, path = "/api/minigames/{challenge_id}/{game}/start", tag = "Minigames", responses(
    (status = 200, body = StartRoundResponse),
    (status = 404),
    (status = 409, body = RoundResultResponse)
))]
pub async fn start_round(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path((challenge_id, game)): Path<(String, String)>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let game = Minigame::parse(&game).ok_or(StatusCode::NOT_FOUND)?;
    let challenges = ctx.challenge_repo();
    let minigames = ctx.minigame_repo();
    let flows = ctx.flow_store();
    let uc = StartRound {
        challenges: challenges.as_ref(),
        minigames: minigames.as_ref(),
        flows: flows.as_ref(),
    };
    match uc
        .execute(user_id, &challenge_id, game)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        StartRoundOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        StartRoundOutcome::AlreadyCompleted {
            part_index,
            revealed_part,
        } => Ok((
            StatusCode::CONFLICT,
            Json(RoundResultResponse {
                success: true,
                message: "already completed".to_string(),
                revealed_part: Some(revealed_part),
                part_index: Some(part_index),
                masked_key: None,
                key_complete: None,
                correct: None,
                total: None,
            }),
        )
            .into_response()),
        StartRoundOutcome::Started {
            flow_id,
            game,
            content,
        } => Ok(Json(StartRoundResponse {
            flow_id,
            game: game.as_str().to_string(),
            content: content.into(),
        })
        .into_response()),
    }
}

#[utoipa::path(post, path = "/api/minigames/{challenge_id}/wheel/complete", tag = "Minigames", request_body = FlowRequest, responses(
    (status = 200, body = RoundResultResponse),
    (status = 404)
))]
pub async fn complete_wheel(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(challenge_id): Path<String>,
    Json(req): Json<FlowRequest>,
) -> Result<Json<RoundResultResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    complete(
        &ctx,
        user_id,
        &challenge_id,
        Minigame::Wheel,
        req.flow_id,
        RoundSubmission::Finished,
    )
    .await
}

#[utoipa::path(post, path = "/api/minigames/{challenge_id}/memory/complete", tag = "Minigames", request_body = FlowRequest, responses(
    (status = 200, body = RoundResultResponse),
    (status = 404)
))]
pub async fn complete_memory(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(challenge_id): Path<String>,
    Json(req): Json<FlowRequest>,
) -> Result<Json<RoundResultResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    complete(
        &ctx,
        user_id,
        &challenge_id,
        Minigame::Memory,
        req.flow_id,
        RoundSubmission::Finished,
    )
    .await
}

#[utoipa::path(post, path = "/api/minigames/{challenge_id}/quiz/submit", tag = "Minigames", request_body = QuizSubmission, responses(
    (status = 200, body = RoundResultResponse),
    (status = 404)
))]
pub async fn submit_quiz(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(challenge_id): Path<String>,
    Json(req): Json<QuizSubmission>,
) -> Result<Json<RoundResultResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    complete(
        &ctx,
        user_id,
        &challenge_id,
        Minigame::Quiz,
        req.flow_id,
        RoundSubmission::Quiz {
            answers: req.answers,
        },
    )
    .await
}

#[utoipa::path(post, path = "/api/minigames/{challenge_id}/slider/submit", tag = "Minigames", request_body = SliderSubmission, responses(
    (status = 200, body = RoundResultResponse),
    (status = 404)
))]
pub async fn submit_slider(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(challenge_id): Path<String>,
    Json(req): Json<SliderSubmission>,
) -> Result<Json<RoundResultResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    complete(
        &ctx,
        user_id,
        &challenge_id,
        Minigame::Slider,
        req.flow_id,
        RoundSubmission::Slider { state: req.state },
    )
    .await
}

#[utoipa::path(post, path = "/api/minigames/{challenge_id}/scramble/submit", tag = "Minigames", request_body = ScrambleSubmission, responses(
    (status = 200, body = RoundResultResponse),
    (status = 404)
))]
pub async fn submit_scramble(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(challenge_id): Path<String>,
    Json(req): Json<ScrambleSubmission>,
) -> Result<Json<RoundResultResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    complete(
        &ctx,
        user_id,
        &challenge_id,
        Minigame::Scramble,
        req.flow_id,
        RoundSubmission::Scramble { answer: req.answer },
    )
    .await
}

async fn complete(
    ctx: &AppContext,
    user_id: Uuid,
    challenge_id: &str,
    game: Minigame,
    flow_id: Uuid,
    submission: RoundSubmission,
) -> Result<Json<RoundResultResponse>, StatusCode> {
    let challenges = ctx.challenge_repo();
    let minigames = ctx.minigame_repo();
    let flows = ctx.flow_store();
    let uc = CompleteRound {
        challenges: challenges.as_ref(),
        minigames: minigames.as_ref(),
        flows: flows.as_ref(),
    };
    match uc
        .execute(user_id, challenge_id, game, flow_id, submission)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        CompleteRoundOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        CompleteRoundOutcome::InvalidFlow => Ok(Json(RoundResultResponse::failure(
            "invalid or expired flow",
        ))),
        CompleteRoundOutcome::QuizFailed { correct, total } => {
            let mut body =
                RoundResultResponse::failure(format!("{correct}/{total}, you need at least 2"));
            body.correct = Some(correct);
            body.total = Some(total);
            Ok(Json(body))
        }
        CompleteRoundOutcome::WrongAnswer { message } => {
            Ok(Json(RoundResultResponse::failure(message)))
        }
        CompleteRoundOutcome::Revealed(revealed) => Ok(Json(RoundResultResponse {
            success: true,
            message: format!("{} complete, key part revealed", revealed.game.title()),
            revealed_part: Some(revealed.part),
            part_index: Some(revealed.part_index),
            masked_key: Some(revealed.masked_key),
            key_complete: Some(revealed.key_complete),
            correct: None,
            total: None,
        })),
    }
}

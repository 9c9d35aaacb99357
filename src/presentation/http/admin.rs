use crate::application::use_cases::admin::create_challenge::{
    CreateChallenge, CreateChallengeOutcome, CreateChallengeRequest as CreateChallengeDto,
};
use crate::application::use_cases::admin::deactivate_challenge::{
    DeactivateChallenge, DeactivateChallengeOutcome,
};
use crate::application::use_cases::admin::list_users::ListUsers;
use crate::application::use_cases::admin::set_user_active::{SetUserActive, SetUserActiveOutcome};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{Bearer, UserResponse, require_user};
use crate::presentation::http::{ApiMessage, message_response};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewChallengeRequest {
    /// Defaults to `{kind}_{difficulty}` when omitted.
    pub id: Option<String>,
    pub kind: String,
    pub difficulty: String,
    pub category: Option<String>,
}

/// Admin view of a challenge. The flag and cipher internals stay server-side
/// even here; regenerating is cheaper than leaking.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminChallengeResponse {
    pub id: String,
    pub kind: String,
    pub difficulty: String,
    pub category: String,
    pub description: String,
    pub points: i32,
    pub hints_total: usize,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id/active", post(set_user_active))
        .route("/challenges", post(create_challenge))
        .route("/challenges/:id", delete(deactivate_challenge))
        .with_state(ctx)
}

/// Resolves the caller and answers 401/403 unless they are an active admin.
async fn require_admin(
    ctx: &AppContext,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Uuid, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let user = ctx
        .user_repo()
        .find_by_id(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    if !user.is_admin {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(user_id)
}

#[utoipa::path(get, path = "/api/admin/users", tag = "Admin",
    params(
        ("limit" = Option<i64>, Query, description = "Page size, capped at 200"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses((status = 200, body = [UserResponse]), (status = 403))
)]
pub async fn list_users(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Query(q): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, StatusCode> {
    require_admin(&ctx, bearer).await?;
    let limit = q.limit.unwrap_or(100).clamp(1, 200);
    let offset = q.offset.unwrap_or(0).max(0);
    let users = ctx.user_repo();
    let uc = ListUsers {
        users: users.as_ref(),
    };
    let rows = uc
        .execute(limit, offset)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(rows.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(post, path = "/api/admin/users/{id}/active", tag = "Admin",
    request_body = SetActiveRequest,
    responses(
        (status = 200, body = UserResponse),
        (status = 400, body = ApiMessage),
        (status = 403),
        (status = 404)
    )
)]
pub async fn set_user_active(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Response, StatusCode> {
    let admin_id = require_admin(&ctx, bearer).await?;
    let users = ctx.user_repo();
    let uc = SetUserActive {
        users: users.as_ref(),
    };
    match uc
        .execute(admin_id, id, req.is_active)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        SetUserActiveOutcome::Updated(row) => {
            Ok(Json(UserResponse::from(row)).into_response())
        }
        SetUserActiveOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        SetUserActiveOutcome::SelfDeactivation => Ok(message_response(
            StatusCode::BAD_REQUEST,
            "you cannot deactivate your own account",
        )),
    }
}

#[utoipa::path(post, path = "/api/admin/challenges", tag = "Admin",
    request_body = NewChallengeRequest,
    responses(
        (status = 201, body = AdminChallengeResponse),
        (status = 400, body = ApiMessage),
        (status = 403),
        (status = 409, body = ApiMessage)
    )
)]
pub async fn create_challenge(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Json(req): Json<NewChallengeRequest>,
) -> Result<Response, StatusCode> {
    require_admin(&ctx, bearer).await?;
    let challenges = ctx.challenge_repo();
    let uc = CreateChallenge {
        challenges: challenges.as_ref(),
    };
    let dto = CreateChallengeDto {
        id: req.id.clone(),
        kind: req.kind.clone(),
        difficulty: req.difficulty.clone(),
        category: req.category.clone(),
    };
    match uc
        .execute(&dto)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        CreateChallengeOutcome::Created(row) => Ok((
            StatusCode::CREATED,
            Json(AdminChallengeResponse {
                id: row.id,
                kind: row.kind,
                difficulty: row.difficulty,
                category: row.category,
                description: row.description,
                points: row.points,
                hints_total: row.hints.len(),
                is_active: row.is_active,
                created_at: row.created_at,
            }),
        )
            .into_response()),
        CreateChallengeOutcome::DuplicateId => Ok(message_response(
            StatusCode::CONFLICT,
            "a challenge with that id already exists",
        )),
        CreateChallengeOutcome::InvalidInput(msg) => {
            Ok(message_response(StatusCode::BAD_REQUEST, msg))
        }
    }
}

#[utoipa::path(delete, path = "/api/admin/challenges/{id}", tag = "Admin",
    params(("id" = String, Path, description = "Challenge id")),
    responses((status = 204), (status = 403), (status = 404))
)]
pub async fn deactivate_challenge(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    require_admin(&ctx, bearer).await?;
    let challenges = ctx.challenge_repo();
    let uc = DeactivateChallenge {
        challenges: challenges.as_ref(),
    };
    match uc
        .execute(&id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        DeactivateChallengeOutcome::Deactivated => Ok(StatusCode::NO_CONTENT),
        DeactivateChallengeOutcome::NotFound => Err(StatusCode::NOT_FOUND),
    }
}

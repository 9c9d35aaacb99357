use crate::application::use_cases::passkeys::finish_enroll::{
    FinishEnrollOutcome, FinishPasskeyEnroll,
};
use crate::application::use_cases::passkeys::finish_login::{
    FinishLoginOutcome, FinishPasskeyLogin,
};
use crate::application::use_cases::passkeys::remove::RemovePasskey;
use crate::application::use_cases::passkeys::start_enroll::{
    StartEnrollOutcome, StartPasskeyEnroll,
};
use crate::application::use_cases::passkeys::start_login::{StartLoginOutcome, StartPasskeyLogin};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{
    Bearer, LoginResponse, UserResponse, issue_token, require_user, session_headers,
};
use crate::presentation::http::{ApiMessage, message_response};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use webauthn_rs::prelude::{PublicKeyCredential, RegisterPublicKeyCredential};

/// One in-flight WebAuthn ceremony: the browser feeds `options` to the
/// credentials API and posts the result back with `flow_id`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CeremonyOptions {
    pub flow_id: Uuid,
    #[schema(value_type = Object)]
    pub options: serde_json::Value,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FinishRegisterRequest {
    pub flow_id: Uuid,
    #[schema(value_type = Object)]
    pub credential: RegisterPublicKeyCredential,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StartLoginRequest {
    pub username: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FinishLoginRequest {
    pub flow_id: Uuid,
    #[schema(value_type = Object)]
    pub credential: PublicKeyCredential,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisteredResponse {
    pub registered: bool,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register/options", post(start_register))
        .route("/register", post(finish_register))
        .route("/login/options", post(start_login))
        .route("/login", post(finish_login))
        .route("/", delete(remove_passkey))
        .route("/status", get(status))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/passkeys/register/options", tag = "Passkeys", responses(
    (status = 200, body = CeremonyOptions)
))]
pub async fn start_register(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Json<CeremonyOptions>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let users = ctx.user_repo();
    let flows = ctx.flow_store();
    let webauthn = ctx.webauthn();
    let uc = StartPasskeyEnroll {
        users: users.as_ref(),
        flows: flows.as_ref(),
        webauthn: webauthn.as_ref(),
    };
    match uc
        .execute(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        StartEnrollOutcome::Started { flow_id, creation } => Ok(Json(CeremonyOptions {
            flow_id,
            options: serde_json::to_value(creation)
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
        })),
        StartEnrollOutcome::NotFound => Err(StatusCode::UNAUTHORIZED),
    }
}

#[utoipa::path(post, path = "/api/passkeys/register", tag = "Passkeys", request_body = FinishRegisterRequest, responses(
    (status = 200, body = RegisteredResponse),
    (status = 400, body = ApiMessage),
    (status = 401, body = ApiMessage)
))]
pub async fn finish_register(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Json(req): Json<FinishRegisterRequest>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let passkeys = ctx.passkey_repo();
    let flows = ctx.flow_store();
    let webauthn = ctx.webauthn();
    let uc = FinishPasskeyEnroll {
        passkeys: passkeys.as_ref(),
        flows: flows.as_ref(),
        webauthn: webauthn.as_ref(),
    };
    match uc
        .execute(user_id, req.flow_id, &req.credential)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        FinishEnrollOutcome::Saved { .. } => {
            Ok(Json(RegisteredResponse { registered: true }).into_response())
        }
        FinishEnrollOutcome::InvalidFlow => Ok(message_response(
            StatusCode::BAD_REQUEST,
            "invalid or expired flow",
        )),
        FinishEnrollOutcome::Rejected(reason) => {
            Ok(message_response(StatusCode::UNAUTHORIZED, reason))
        }
    }
}

#[utoipa::path(post, path = "/api/passkeys/login/options", tag = "Passkeys", request_body = StartLoginRequest, security(()), responses(
    (status = 200, body = CeremonyOptions),
    (status = 404, body = ApiMessage),
    (status = 423, body = ApiMessage)
))]
pub async fn start_login(
    State(ctx): State<AppContext>,
    Json(req): Json<StartLoginRequest>,
) -> Result<Response, StatusCode> {
    let users = ctx.user_repo();
    let passkeys = ctx.passkey_repo();
    let flows = ctx.flow_store();
    let webauthn = ctx.webauthn();
    let uc = StartPasskeyLogin {
        users: users.as_ref(),
        passkeys: passkeys.as_ref(),
        flows: flows.as_ref(),
        webauthn: webauthn.as_ref(),
    };
    match uc
        .execute(req.username.trim())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        StartLoginOutcome::Started { flow_id, request } => Ok(Json(CeremonyOptions {
            flow_id,
            options: serde_json::to_value(request)
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
        })
        .into_response()),
        StartLoginOutcome::NotAvailable => Ok(message_response(
            StatusCode::NOT_FOUND,
            "no passkey registered for this account",
        )),
        StartLoginOutcome::Deactivated => Ok(message_response(
            StatusCode::LOCKED,
            "account deactivated, contact support",
        )),
    }
}

#[utoipa::path(post, path = "/api/passkeys/login", tag = "Passkeys", request_body = FinishLoginRequest, security(()), responses(
    (status = 200, body = LoginResponse),
    (status = 400, body = ApiMessage),
    (status = 401, body = ApiMessage),
    (status = 423, body = ApiMessage)
))]
pub async fn finish_login(
    State(ctx): State<AppContext>,
    Json(req): Json<FinishLoginRequest>,
) -> Result<Response, StatusCode> {
    let users = ctx.user_repo();
    let passkeys = ctx.passkey_repo();
    let flows = ctx.flow_store();
    let webauthn = ctx.webauthn();
    let uc = FinishPasskeyLogin {
        users: users.as_ref(),
        passkeys: passkeys.as_ref(),
        flows: flows.as_ref(),
        webauthn: webauthn.as_ref(),
    };
    let user = match uc
        .execute(req.flow_id, &req.credential)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        FinishLoginOutcome::Success(user) => user,
        FinishLoginOutcome::InvalidFlow => {
            return Ok(message_response(
                StatusCode::BAD_REQUEST,
                "invalid or expired flow",
            ));
        }
        FinishLoginOutcome::Rejected(reason) => {
            return Ok(message_response(StatusCode::UNAUTHORIZED, reason));
        }
        FinishLoginOutcome::Deactivated => {
            return Ok(message_response(
                StatusCode::LOCKED,
                "account deactivated, contact support",
            ));
        }
    };
    let token = issue_token(&ctx.cfg, user.id)?;
    let headers = session_headers(&ctx.cfg, &token);
    Ok((
        headers,
        Json(LoginResponse {
            access_token: token,
            user: UserResponse::from(user),
        }),
    )
        .into_response())
}

#[utoipa::path(delete, path = "/api/passkeys", tag = "Passkeys", responses(
    (status = 204),
    (status = 404)
))]
pub async fn remove_passkey(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<StatusCode, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let repo = ctx.passkey_repo();
    let uc = RemovePasskey { repo: repo.as_ref() };
    let removed = uc
        .execute(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

#[utoipa::path(get, path = "/api/passkeys/status", tag = "Passkeys", responses(
    (status = 200, body = RegisteredResponse)
))]
pub async fn status(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Json<RegisteredResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let registered = ctx
        .passkey_repo()
        .find_for_user(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .is_some();
    Ok(Json(RegisteredResponse { registered }))
}

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

pub mod admin;
pub mod auth;
pub mod challenges;
pub mod health;
pub mod marketplace;
pub mod messages;
pub mod minigames;
pub mod passkeys;

/// Plain `{"message": ...}` body used wherever a handler has nothing
/// richer to say.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiMessage {
    pub message: String,
}

pub(crate) fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiMessage {
            message: message.into(),
        }),
    )
        .into_response()
}

use crate::application::ports::message_repository::{ConversationRow, MessageRow};
use crate::application::use_cases::messages::conversations::Conversations;
use crate::application::use_cases::messages::get_thread::{GetThread, GetThreadOutcome};
use crate::application::use_cases::messages::send_message::{SendMessage, SendMessageOutcome};
use crate::application::use_cases::messages::unread::UnreadCount;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{Bearer, require_user};
use crate::presentation::http::{ApiMessage, message_response};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationResponse {
    pub peer_id: Uuid,
    pub peer_username: String,
    pub last_message: String,
    pub last_at: DateTime<Utc>,
    pub unread: i64,
}

impl From<ConversationRow> for ConversationResponse {
    fn from(row: ConversationRow) -> Self {
        Self {
            peer_id: row.peer_id,
            peer_username: row.peer_username,
            last_message: row.last_message,
            last_at: row.last_at,
            unread: row.unread,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for MessageResponse {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            sender_id: row.sender_id,
            recipient_id: row.recipient_id,
            content: row.body,
            read: row.is_read,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ThreadResponse {
    pub peer_id: Uuid,
    pub peer_username: String,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: i64,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(list_conversations))
        .route("/unread-count", get(unread_count))
        .route("/with/:username", get(thread).post(send))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/messages", tag = "Messages", responses(
    (status = 200, body = [ConversationResponse])
))]
pub async fn list_conversations(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Json<Vec<ConversationResponse>>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let messages = ctx.message_repo();
    let uc = Conversations {
        messages: messages.as_ref(),
    };
    let rows = uc
        .execute(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(
        rows.into_iter().map(ConversationResponse::from).collect(),
    ))
}

#[utoipa::path(get, path = "/api/messages/with/{username}", tag = "Messages",
    params(("username" = String, Path, description = "Peer username")),
    responses(
        (status = 200, body = ThreadResponse),
        (status = 400, body = ApiMessage),
        (status = 404, body = ApiMessage)
    )
)]
pub async fn thread(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(username): Path<String>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let users = ctx.user_repo();
    let messages = ctx.message_repo();
    let uc = GetThread {
        users: users.as_ref(),
        messages: messages.as_ref(),
    };
    match uc
        .execute(user_id, &username)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        GetThreadOutcome::Thread(view) => Ok(Json(ThreadResponse {
            peer_id: view.peer_id,
            peer_username: view.peer_username,
            messages: view
                .messages
                .into_iter()
                .map(MessageResponse::from)
                .collect(),
        })
        .into_response()),
        GetThreadOutcome::UnknownPeer => {
            Ok(message_response(StatusCode::NOT_FOUND, "no such user"))
        }
        GetThreadOutcome::SelfThread => Ok(message_response(
            StatusCode::BAD_REQUEST,
            "you cannot message yourself",
        )),
    }
}

#[utoipa::path(post, path = "/api/messages/with/{username}", tag = "Messages",
    params(("username" = String, Path, description = "Peer username")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, body = MessageResponse),
        (status = 400, body = ApiMessage),
        (status = 404, body = ApiMessage)
    )
)]
pub async fn send(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(username): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let users = ctx.user_repo();
    let messages = ctx.message_repo();
    let uc = SendMessage {
        users: users.as_ref(),
        messages: messages.as_ref(),
    };
    match uc
        .execute(user_id, &username, &req.content)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        SendMessageOutcome::Sent(row) => {
            Ok((StatusCode::CREATED, Json(MessageResponse::from(row))).into_response())
        }
        SendMessageOutcome::UnknownPeer => {
            Ok(message_response(StatusCode::NOT_FOUND, "no such user"))
        }
        SendMessageOutcome::SelfMessage => Ok(message_response(
            StatusCode::BAD_REQUEST,
            "you cannot message yourself",
        )),
        SendMessageOutcome::EmptyContent => Ok(message_response(
            StatusCode::BAD_REQUEST,
            "message content cannot be empty",
        )),
    }
}

#[utoipa::path(get, path = "/api/messages/unread-count", tag = "Messages", responses(
    (status = 200, body = UnreadCountResponse)
))]
pub async fn unread_count(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Json<UnreadCountResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let messages = ctx.message_repo();
    let uc = UnreadCount {
        messages: messages.as_ref(),
    };
    let count = uc
        .execute(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(UnreadCountResponse { count }))
}

use crate::application::services::emails::{self, EmailContent};
use crate::application::use_cases::auth::forgot_password::ForgotPassword;
use crate::application::use_cases::auth::login::{
    Login as LoginUc, LoginOutcome, LoginRequest as LoginDto,
};
use crate::application::use_cases::auth::me::GetMe;
use crate::application::use_cases::auth::register::{
    Register as RegisterUc, RegisterOutcome, RegisterRequest as RegisterDto,
};
use crate::application::use_cases::auth::resend_verification::ResendVerification;
use crate::application::use_cases::auth::reset_password::{ResetPassword, ResetPasswordOutcome};
use crate::application::use_cases::auth::verify_email::{VerifyEmail, VerifyEmailOutcome};
use crate::application::ports::user_repository::UserRow;
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::presentation::http::marketplace::{BuyerResponse, SellerResponse};
use crate::presentation::http::{ApiMessage, message_response};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            email_verified: row.email_verified,
            is_active: row.is_active,
            is_admin: row.is_admin,
            created_at: row.created_at,
            last_login: row.last_login,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Set by the admin portal; rejects non-admin accounts up front.
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewPasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SolveResponse {
    pub challenge_id: String,
    pub solved_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub score: i64,
    pub solves: Vec<SolveResponse>,
    pub has_passkey: bool,
    pub buyer: Option<BuyerResponse>,
    pub seller: Option<SellerResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/verify/:token", get(verify_email))
        .route("/resend-verification", post(resend_verification))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/:token", post(reset_password))
        .with_state(ctx)
}

#[utoipa::path(post, path = "/api/auth/register", tag = "Auth", request_body = RegisterRequest, security(()), responses(
    (status = 201, body = UserResponse),
    (status = 400, body = ApiMessage),
    (status = 409, body = ApiMessage)
))]
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, StatusCode> {
    let repo = ctx.user_repo();
    let uc = RegisterUc {
        repo: repo.as_ref(),
    };
    let dto = RegisterDto {
        username: req.username.clone(),
        email: req.email.clone(),
        password: req.password.clone(),
    };
    let outcome = uc
        .execute(&dto)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    match outcome {
        RegisterOutcome::Created {
            user,
            verification_token,
        } => {
            if let Some(email) = user.email.clone() {
                let content = emails::verification_email(&ctx.cfg.link_base(), &verification_token);
                send_mail_in_background(&ctx, email, user.username.clone(), content);
            }
            Ok((StatusCode::CREATED, Json(UserResponse::from(user))).into_response())
        }
        RegisterOutcome::UsernameTaken => Ok(message_response(
            StatusCode::CONFLICT,
            "username already taken",
        )),
        RegisterOutcome::EmailTaken => Ok(message_response(
            StatusCode::CONFLICT,
            "email already registered",
        )),
        RegisterOutcome::InvalidInput(msg) => Ok(message_response(StatusCode::BAD_REQUEST, msg)),
    }
}

#[utoipa::path(get, path = "/api/auth/verify/{token}", tag = "Auth", security(()), responses(
    (status = 200, body = ApiMessage),
    (status = 404),
    (status = 410, body = ApiMessage)
))]
pub async fn verify_email(
    State(ctx): State<AppContext>,
    Path(token): Path<String>,
) -> Result<Response, StatusCode> {
    let repo = ctx.user_repo();
    let uc = VerifyEmail {
        repo: repo.as_ref(),
    };
    match uc
        .execute(&token)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        VerifyEmailOutcome::Verified(_) => Ok(message_response(
            StatusCode::OK,
            "email verified, you can now log in",
        )),
        VerifyEmailOutcome::Invalid => Err(StatusCode::NOT_FOUND),
        VerifyEmailOutcome::Expired => Ok(message_response(
            StatusCode::GONE,
            "verification link expired, request a new one",
        )),
    }
}

#[utoipa::path(post, path = "/api/auth/resend-verification", tag = "Auth", request_body = EmailRequest, security(()), responses(
    (status = 202, body = ApiMessage)
))]
pub async fn resend_verification(
    State(ctx): State<AppContext>,
    Json(req): Json<EmailRequest>,
) -> Result<Response, StatusCode> {
    let repo = ctx.user_repo();
    let uc = ResendVerification {
        repo: repo.as_ref(),
    };
    if let Some(pending) = uc
        .execute(req.email.trim())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        let content = emails::verification_email(&ctx.cfg.link_base(), &pending.token);
        send_mail_in_background(&ctx, pending.email, pending.username, content);
    }
    // Identical reply whether or not the account exists.
    Ok(message_response(
        StatusCode::ACCEPTED,
        "if that email needs verification, a new link is on its way",
    ))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "Auth", request_body = LoginRequest, security(()), responses(
    (status = 200, body = LoginResponse),
    (status = 401, body = ApiMessage),
    (status = 403, body = ApiMessage),
    (status = 423, body = ApiMessage)
))]
pub async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, StatusCode> {
    let repo = ctx.user_repo();
    let uc = LoginUc {
        repo: repo.as_ref(),
    };
    let dto = LoginDto {
        username: req.username.clone(),
        password: req.password.clone(),
        admin: req.admin,
    };
    let user = match uc
        .execute(&dto)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        LoginOutcome::Success(user) => user,
        LoginOutcome::BadCredentials => {
            return Ok(message_response(
                StatusCode::UNAUTHORIZED,
                "invalid username or password",
            ));
        }
        LoginOutcome::EmailUnverified => {
            return Ok(message_response(
                StatusCode::FORBIDDEN,
                "email not verified, check your inbox",
            ));
        }
        LoginOutcome::NotAdmin => {
            return Ok(message_response(
                StatusCode::FORBIDDEN,
                "admin access required",
            ));
        }
        LoginOutcome::Deactivated => {
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

#[utoipa::path(get, path = "/api/auth/me", tag = "Auth", responses((status = 200, body = ProfileResponse)))]
pub async fn me(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Json<ProfileResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let users = ctx.user_repo();
    let progress = ctx.progress_repo();
    let passkeys = ctx.passkey_repo();
    let buyers = ctx.buyer_repo();
    let sellers = ctx.seller_repo();
    let uc = GetMe {
        users: users.as_ref(),
        progress: progress.as_ref(),
        passkeys: passkeys.as_ref(),
        buyers: buyers.as_ref(),
        sellers: sellers.as_ref(),
    };
    let profile = uc
        .execute(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;
    Ok(Json(ProfileResponse {
        user: UserResponse::from(profile.user),
        score: profile.score,
        solves: profile
            .solves
            .into_iter()
            .map(|s| SolveResponse {
                challenge_id: s.challenge_id,
                solved_at: s.solved_at,
            })
            .collect(),
        has_passkey: profile.has_passkey,
        buyer: profile.buyer.map(BuyerResponse::from),
        seller: profile.seller.map(SellerResponse::from),
    }))
}

#[utoipa::path(post, path = "/api/auth/forgot-password", tag = "Auth", request_body = EmailRequest, security(()), responses(
    (status = 202, body = ApiMessage)
))]
pub async fn forgot_password(
    State(ctx): State<AppContext>,
    Json(req): Json<EmailRequest>,
) -> Result<Response, StatusCode> {
    let repo = ctx.user_repo();
    let uc = ForgotPassword {
        repo: repo.as_ref(),
    };
    if let Some(pending) = uc
        .execute(req.email.trim())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        let content = emails::password_reset_email(&ctx.cfg.link_base(), &pending.token);
        send_mail_in_background(&ctx, pending.email, pending.username, content);
    }
    Ok(message_response(
        StatusCode::ACCEPTED,
        "if that email has an account, a reset link is on its way",
    ))
}

#[utoipa::path(post, path = "/api/auth/reset-password/{token}", tag = "Auth", request_body = NewPasswordRequest, security(()), responses(
    (status = 200, body = ApiMessage),
    (status = 400, body = ApiMessage),
    (status = 404),
    (status = 410, body = ApiMessage)
))]
pub async fn reset_password(
    State(ctx): State<AppContext>,
    Path(token): Path<String>,
    Json(req): Json<NewPasswordRequest>,
) -> Result<Response, StatusCode> {
    let repo = ctx.user_repo();
    let uc = ResetPassword {
        repo: repo.as_ref(),
    };
    match uc
        .execute(&token, &req.password)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        ResetPasswordOutcome::Done => Ok(message_response(StatusCode::OK, "password updated")),
        ResetPasswordOutcome::WeakPassword => Ok(message_response(
            StatusCode::BAD_REQUEST,
            "password must be at least 8 characters",
        )),
        ResetPasswordOutcome::Invalid => Err(StatusCode::NOT_FOUND),
        ResetPasswordOutcome::Expired => Ok(message_response(
            StatusCode::GONE,
            "reset link expired, request a new one",
        )),
    }
}

#[utoipa::path(post, path = "/api/auth/logout", tag = "Auth", responses((status = 204)))]
pub async fn logout(State(ctx): State<AppContext>) -> Result<(HeaderMap, StatusCode), StatusCode> {
    // Clear cookie by setting it expired
    let mut headers = HeaderMap::new();
    let secure = ctx
        .cfg
        .frontend_url
        .as_deref()
        .map(|u| u.starts_with("https://"))
        .unwrap_or(false);
    let cookie = if secure {
        "access_token=; HttpOnly; Secure; Path=/; Max-Age=0; SameSite=Lax"
    } else {
        "access_token=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax"
    };
    headers.insert(
        axum::http::header::SET_COOKIE,
        axum::http::HeaderValue::from_str(cookie)
            .unwrap_or(axum::http::HeaderValue::from_static("")),
    );
    Ok((headers, StatusCode::NO_CONTENT))
}

fn send_mail_in_background(ctx: &AppContext, email: String, name: String, content: EmailContent) {
    let mailer = ctx.mailer();
    tokio::spawn(async move {
        if let Err(e) = mailer
            .send(&email, &name, &content.subject, &content.html_body)
            .await
        {
            tracing::warn!(to = %email, error = ?e, "email_send_failed");
        }
    });
}

// --- Bearer extractor & session token utils ---
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 1) Prefer Authorization header if present
        if let Some(auth) = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(t) = auth.strip_prefix("Bearer ") {
                return Ok(Bearer(t.to_string()));
            }
        }

        // 2) Fallback to HttpOnly cookie `access_token`
        if let Some(cookie_hdr) = parts
            .headers
            .get(axum::http::header::COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(token) = get_cookie(cookie_hdr, "access_token") {
                return Ok(Bearer(token));
            }
        }

        Err(StatusCode::UNAUTHORIZED)
    }
}

pub(crate) fn validate_bearer(cfg: &Config, bearer: Bearer) -> Result<String, StatusCode> {
    let token = bearer.0;
    let data = jsonwebtoken::decode::<Claims>(
        &token,
        &DecodingKey::from_secret(cfg.secret_key.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;
    Ok(data.claims.sub)
}

/// Resolves the authenticated user id or answers 401 for the caller.
pub(crate) fn require_user(
    cfg: &Config,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Uuid, StatusCode> {
    let sub = validate_bearer(cfg, bearer?)?;
    Uuid::parse_str(&sub).map_err(|_| StatusCode::UNAUTHORIZED)
}

pub(crate) fn issue_token(cfg: &Config, user_id: Uuid) -> Result<String, StatusCode> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + (cfg.session_expires_secs.max(0) as usize),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.secret_key.as_bytes()),
    )
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Set-Cookie headers carrying the session token.
pub(crate) fn session_headers(cfg: &Config, token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let secure = cfg
        .frontend_url
        .as_deref()
        .map(|u| u.starts_with("https://"))
        .unwrap_or(false);
    let cookie = build_access_cookie(token, cfg.session_expires_secs, secure);
    headers.insert(
        axum::http::header::SET_COOKIE,
        axum::http::HeaderValue::from_str(&cookie)
            .unwrap_or(axum::http::HeaderValue::from_static("")),
    );
    headers
}

// --- Cookie helpers ---

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

fn build_access_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    // Note: SameSite=Lax for typical same-site SPA/API setups.
    // In cross-site deployments, consider SameSite=None; Secure and CSRF protection.
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "access_token={}; HttpOnly{}; Path=/; Max-Age={}; SameSite=Lax",
        token,
        secure_attr,
        max_age_secs.max(0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_cookie_carries_the_token_and_lifetime() {
        let cookie = build_access_cookie("tok123", 3600, false);
        assert_eq!(
            cookie,
            "access_token=tok123; HttpOnly; Path=/; Max-Age=3600; SameSite=Lax"
        );
    }

    #[test]
    fn access_cookie_adds_secure_for_https_frontends() {
        let cookie = build_access_cookie("tok123", 60, true);
        assert!(cookie.contains("; Secure;"));
        // Negative lifetimes clamp to an immediate expiry rather than
        // producing an invalid attribute.
        let expired = build_access_cookie("tok123", -5, true);
        assert!(expired.contains("Max-Age=0"));
    }

    #[test]
    fn get_cookie_picks_the_named_value() {
        let header = "theme=dark; access_token=abc.def.ghi; lang=en";
        assert_eq!(get_cookie(header, "access_token").as_deref(), Some("abc.def.ghi"));
        assert_eq!(get_cookie(header, "missing"), None);
    }

    #[test]
    fn issued_tokens_validate_round_trip() {
        let cfg = Config::for_tests();
        let id = Uuid::new_v4();
        let token = issue_token(&cfg, id).unwrap();
        let sub = validate_bearer(&cfg, Bearer(token)).unwrap();
        assert_eq!(sub, id.to_string());
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let cfg = Config::for_tests();
        let mut other = Config::for_tests();
        other.secret_key = "a-completely-different-secret".into();
        let token = issue_token(&other, Uuid::new_v4()).unwrap();
        assert!(validate_bearer(&cfg, Bearer(token)).is_err());
    }
}

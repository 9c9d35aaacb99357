use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use momento_api::application::ports::flow_store::FlowStore;
use momento_api::application::ports::mailer::Mailer;
use momento_api::application::services::rate_limit::RateLimiter;
use momento_api::bootstrap::app_context::{AppContext, AppServices};
use momento_api::bootstrap::config::Config;
use momento_api::bootstrap::seed;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            momento_api::presentation::http::auth::register,
            momento_api::presentation::http::auth::verify_email,
            momento_api::presentation::http::auth::resend_verification,
            momento_api::presentation::http::auth::login,
            momento_api::presentation::http::auth::logout,
            momento_api::presentation::http::auth::me,
            momento_api::presentation::http::auth::forgot_password,
            momento_api::presentation::http::auth::reset_password,
            momento_api::presentation::http::passkeys::start_register,
            momento_api::presentation::http::passkeys::finish_register,
            momento_api::presentation::http::passkeys::start_login,
            momento_api::presentation::http::passkeys::finish_login,
            momento_api::presentation::http::passkeys::remove_passkey,
            momento_api::presentation::http::passkeys::status,
            momento_api::presentation::http::challenges::list_challenges,
            momento_api::presentation::http::challenges::get_challenge,
            momento_api::presentation::http::challenges::submit_flag,
            momento_api::presentation::http::challenges::take_hint,
            momento_api::presentation::http::minigames::overview,
            momento_api::presentation::http::minigames::hub,
            momento_api::presentation::http::minigames::start_round,
            momento_api::presentation::http::minigames::complete_wheel,
            momento_api::presentation::http::minigames::complete_memory,
            momento_api::presentation::http::minigames::submit_quiz,
            momento_api::presentation::http::minigames::submit_slider,
            momento_api::presentation::http::minigames::submit_scramble,
            momento_api::presentation::http::marketplace::landing,
            momento_api::presentation::http::marketplace::create_buyer,
            momento_api::presentation::http::marketplace::create_seller,
            momento_api::presentation::http::marketplace::buyer_verification,
            momento_api::presentation::http::marketplace::seller_verification,
            momento_api::presentation::http::marketplace::list_products,
            momento_api::presentation::http::marketplace::my_products,
            momento_api::presentation::http::marketplace::create_product,
            momento_api::presentation::http::marketplace::update_product,
            momento_api::presentation::http::marketplace::delete_product,
            momento_api::presentation::http::marketplace::upload_product_image,
            momento_api::presentation::http::marketplace::serve_product_image,
            momento_api::presentation::http::marketplace::checkout,
            momento_api::presentation::http::marketplace::mpesa_callback,
            momento_api::presentation::http::marketplace::stripe_webhook,
            momento_api::presentation::http::marketplace::list_orders,
            momento_api::presentation::http::marketplace::order_detail,
            momento_api::presentation::http::marketplace::payment_status,
            momento_api::presentation::http::marketplace::seller_orders,
            momento_api::presentation::http::marketplace::update_delivery,
            momento_api::presentation::http::messages::list_conversations,
            momento_api::presentation::http::messages::thread,
            momento_api::presentation::http::messages::send,
            momento_api::presentation::http::messages::unread_count,
            momento_api::presentation::http::admin::list_users,
            momento_api::presentation::http::admin::set_user_active,
            momento_api::presentation::http::admin::create_challenge,
            momento_api::presentation::http::admin::deactivate_challenge,
            momento_api::presentation::http::health::health,
        ),
        components(schemas(
            momento_api::presentation::http::ApiMessage,
            momento_api::presentation::http::auth::RegisterRequest,
            momento_api::presentation::http::auth::LoginRequest,
            momento_api::presentation::http::auth::LoginResponse,
            momento_api::presentation::http::auth::UserResponse,
            momento_api::presentation::http::auth::EmailRequest,
            momento_api::presentation::http::auth::NewPasswordRequest,
            momento_api::presentation::http::auth::SolveResponse,
            momento_api::presentation::http::auth::ProfileResponse,
            momento_api::presentation::http::passkeys::CeremonyOptions,
            momento_api::presentation::http::passkeys::FinishRegisterRequest,
            momento_api::presentation::http::passkeys::StartLoginRequest,
            momento_api::presentation::http::passkeys::FinishLoginRequest,
            momento_api::presentation::http::passkeys::RegisteredResponse,
            momento_api::presentation::http::challenges::ChallengeSummary,
            momento_api::presentation::http::challenges::VerificationProgressResponse,
            momento_api::presentation::http::challenges::ChallengeListResponse,
            momento_api::presentation::http::challenges::ChallengeDetailResponse,
            momento_api::presentation::http::challenges::SubmitFlagRequest,
            momento_api::presentation::http::challenges::TierStandingResponse,
            momento_api::presentation::http::challenges::SubmitFlagResponse,
            momento_api::presentation::http::challenges::HintResponse,
            momento_api::presentation::http::minigames::OverviewEntry,
            momento_api::presentation::http::minigames::PartResponse,
            momento_api::presentation::http::minigames::HubResponse,
            momento_api::presentation::http::minigames::WheelSegmentResponse,
            momento_api::presentation::http::minigames::QuizPromptResponse,
            momento_api::presentation::http::minigames::MemoryCardResponse,
            momento_api::presentation::http::minigames::RoundContentResponse,
            momento_api::presentation::http::minigames::StartRoundResponse,
            momento_api::presentation::http::minigames::FlowRequest,
            momento_api::presentation::http::minigames::QuizSubmission,
            momento_api::presentation::http::minigames::SliderSubmission,
            momento_api::presentation::http::minigames::ScrambleSubmission,
            momento_api::presentation::http::minigames::RoundResultResponse,
            momento_api::presentation::http::marketplace::BuyerResponse,
            momento_api::presentation::http::marketplace::SellerResponse,
            momento_api::presentation::http::marketplace::ProductResponse,
            momento_api::presentation::http::marketplace::ListedProductResponse,
            momento_api::presentation::http::marketplace::LandingResponse,
            momento_api::presentation::http::marketplace::CreateBuyerRequest,
            momento_api::presentation::http::marketplace::CreateSellerRequest,
            momento_api::presentation::http::marketplace::TierChallengeResponse,
            momento_api::presentation::http::marketplace::VerificationViewResponse,
            momento_api::presentation::http::marketplace::CreateProductRequest,
            momento_api::presentation::http::marketplace::UpdateProductRequest,
            momento_api::presentation::http::marketplace::CheckoutRequest,
            momento_api::presentation::http::marketplace::CheckoutResponse,
            momento_api::presentation::http::marketplace::PaymentResponse,
            momento_api::presentation::http::marketplace::OrderResponse,
            momento_api::presentation::http::marketplace::PaymentStatusResponse,
            momento_api::presentation::http::marketplace::UpdateDeliveryRequest,
            momento_api::presentation::http::marketplace::DeliveryUpdateResponse,
            momento_api::presentation::http::messages::ConversationResponse,
            momento_api::presentation::http::messages::MessageResponse,
            momento_api::presentation::http::messages::ThreadResponse,
            momento_api::presentation::http::messages::SendMessageRequest,
            momento_api::presentation::http::messages::UnreadCountResponse,
            momento_api::presentation::http::admin::SetActiveRequest,
            momento_api::presentation::http::admin::NewChallengeRequest,
            momento_api::presentation::http::admin::AdminChallengeResponse,
            momento_api::presentation::http::health::HealthResp,
        )),
        tags(
            (name = "Auth", description = "Registration, login and profile"),
            (name = "Passkeys", description = "WebAuthn enrolment and login"),
            (name = "Challenges", description = "Crypto challenges, flags and hints"),
            (name = "Minigames", description = "Key-part minigames"),
            (name = "Marketplace", description = "Profiles, products, checkout and orders"),
            (name = "Messages", description = "Direct messaging"),
            (name = "Admin", description = "Administration"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "momento_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(port = cfg.api_port, "Starting Momento backend");

    // Database
    let pool = momento_api::infrastructure::db::connect_pool(&cfg.database_url).await?;
    momento_api::infrastructure::db::migrate(&pool).await?;

    let user_repo = Arc::new(
        momento_api::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository::new(
            pool.clone(),
        ),
    );
    let challenge_repo = Arc::new(
        momento_api::infrastructure::db::repositories::challenge_repository_sqlx::SqlxChallengeRepository::new(
            pool.clone(),
        ),
    );
    let progress_repo = Arc::new(
        momento_api::infrastructure::db::repositories::progress_repository_sqlx::SqlxProgressRepository::new(
            pool.clone(),
        ),
    );
    let minigame_repo = Arc::new(
        momento_api::infrastructure::db::repositories::minigame_repository_sqlx::SqlxMinigameRepository::new(
            pool.clone(),
        ),
    );
    let buyer_repo = Arc::new(
        momento_api::infrastructure::db::repositories::buyer_repository_sqlx::SqlxBuyerRepository::new(
            pool.clone(),
        ),
    );
    let seller_repo = Arc::new(
        momento_api::infrastructure::db::repositories::seller_repository_sqlx::SqlxSellerRepository::new(
            pool.clone(),
        ),
    );
    let product_repo = Arc::new(
        momento_api::infrastructure::db::repositories::product_repository_sqlx::SqlxProductRepository::new(
            pool.clone(),
        ),
    );
    let order_repo = Arc::new(
        momento_api::infrastructure::db::repositories::order_repository_sqlx::SqlxOrderRepository::new(
            pool.clone(),
        ),
    );
    let message_repo = Arc::new(
        momento_api::infrastructure::db::repositories::message_repository_sqlx::SqlxMessageRepository::new(
            pool.clone(),
        ),
    );
    let passkey_repo = Arc::new(
        momento_api::infrastructure::db::repositories::passkey_repository_sqlx::SqlxPasskeyRepository::new(
            pool.clone(),
        ),
    );

    seed::ensure_admin(&cfg, user_repo.as_ref()).await?;
    seed::ensure_default_challenges(challenge_repo.as_ref()).await?;

    let flow_store = Arc::new(momento_api::infrastructure::flows::InMemoryFlowStore::new());
    let image_store = Arc::new(momento_api::infrastructure::storage::FsImageStore::new(
        &cfg.uploads_dir,
    ));
    let mailer: Arc<dyn Mailer> = match cfg.brevo_api_key.as_deref() {
        Some(key) => Arc::new(momento_api::infrastructure::email::brevo::BrevoMailer::new(
            key,
            &cfg.sender_email,
            &cfg.sender_name,
        )),
        None => {
            tracing::info!("brevo_not_configured_logging_emails_instead");
            Arc::new(momento_api::infrastructure::email::noop::NoopMailer)
        }
    };
    let mpesa_gateway = Arc::new(
        momento_api::infrastructure::payments::daraja::DarajaClient::from_config(&cfg),
    );
    let stripe_gateway = Arc::new(
        momento_api::infrastructure::payments::stripe::StripeClient::from_config(&cfg),
    );
    let webauthn = Arc::new(momento_api::infrastructure::webauthn::build_webauthn(&cfg)?);
    let flag_limiter = Arc::new(RateLimiter::new(
        Duration::from_secs(cfg.rate_limit_window_secs),
        cfg.rate_limit_max_requests as usize,
    ));

    let services = AppServices::new(
        user_repo,
        challenge_repo,
        progress_repo,
        minigame_repo,
        buyer_repo,
        seller_repo,
        product_repo,
        order_repo,
        message_repo,
        passkey_repo,
        flow_store.clone(),
        image_store,
        mailer,
        mpesa_gateway,
        stripe_gateway,
        webauthn,
        flag_limiter.clone(),
    );

    let ctx = AppContext::new(cfg.clone(), services);

    // Build CORS
    let cors = if let Some(origin) = cfg.frontend_url.clone() {
        match HeaderValue::from_str(&origin) {
            Ok(v) => CorsLayer::new()
                .allow_origin(v)
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::DELETE,
                    http::Method::PATCH,
                    http::Method::OPTIONS,
                ])
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
                .allow_credentials(true),
            Err(_) => CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::DELETE,
                    http::Method::PATCH,
                    http::Method::OPTIONS,
                ])
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
                .allow_credentials(true),
        }
    } else if cfg.is_production {
        // FRONTEND_URL is mandatory in production; fall back to deny-all
        CorsLayer::new()
            .allow_origin(AllowOrigin::exact(HeaderValue::from_static("http://invalid")))
            .allow_methods([
                http::Method::GET,
                http::Method::POST,
                http::Method::PUT,
                http::Method::DELETE,
                http::Method::PATCH,
                http::Method::OPTIONS,
            ])
            .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
    } else {
        // Development convenience
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods([
                http::Method::GET,
                http::Method::POST,
                http::Method::PUT,
                http::Method::DELETE,
                http::Method::PATCH,
                http::Method::OPTIONS,
            ])
            .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
            .allow_credentials(true)
    };

    // Ensure the uploads dir exists
    if let Err(e) = tokio::fs::create_dir_all(&cfg.uploads_dir).await {
        tracing::warn!(error = ?e, dir = %cfg.uploads_dir, "Failed to create uploads dir");
    }

    // Build API router
    let app = Router::new()
        .nest(
            "/api",
            momento_api::presentation::http::health::routes(pool.clone()),
        )
        .nest(
            "/api/auth",
            momento_api::presentation::http::auth::routes(ctx.clone()),
        )
        .nest(
            "/api/passkeys",
            momento_api::presentation::http::passkeys::routes(ctx.clone()),
        )
        .nest(
            "/api/challenges",
            momento_api::presentation::http::challenges::routes(ctx.clone()),
        )
        .nest(
            "/api/minigames",
            momento_api::presentation::http::minigames::routes(ctx.clone()),
        )
        .nest(
            "/api/marketplace",
            momento_api::presentation::http::marketplace::routes(ctx.clone()),
        )
        .nest(
            "/api/messages",
            momento_api::presentation::http::messages::routes(ctx.clone()),
        )
        .nest(
            "/api/admin",
            momento_api::presentation::http::admin::routes(ctx.clone()),
        )
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        // Global body size limit for uploads (configurable)
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    let api_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app).await?;
        Ok(())
    });

    // Background sweep: expired ceremony/minigame flows and idle limiter keys
    let sweep_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        loop {
            sleep(Duration::from_secs(300)).await;
            match flow_store.purge_expired().await {
                Ok(n) if n > 0 => tracing::debug!(purged = n, "flows_swept"),
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "flow_sweep_failed"),
            }
            let dropped = flag_limiter.purge();
            if dropped > 0 {
                tracing::debug!(dropped, "rate_limit_keys_swept");
            }
        }
    });

    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(?e, "API server task failed"),
        Err(e) => error!(?e, "API server task panicked"),
    }

    sweep_handle.abort();
    Ok(())
}

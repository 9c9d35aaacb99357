use std::sync::Arc;

use webauthn_rs::Webauthn;

use crate::application::ports::buyer_repository::BuyerRepository;
use crate::application::ports::challenge_repository::ChallengeRepository;
use crate::application::ports::flow_store::FlowStore;
use crate::application::ports::image_store::ImageStore;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::message_repository::MessageRepository;
use crate::application::ports::minigame_repository::MinigameRepository;
use crate::application::ports::mpesa_gateway::MpesaGateway;
use crate::application::ports::order_repository::OrderRepository;
use crate::application::ports::passkey_repository::PasskeyRepository;
use crate::application::ports::product_repository::ProductRepository;
use crate::application::ports::progress_repository::ProgressRepository;
use crate::application::ports::seller_repository::SellerRepository;
use crate::application::ports::stripe_gateway::StripeGateway;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::rate_limit::RateLimiter;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    challenge_repo: Arc<dyn ChallengeRepository>,
    progress_repo: Arc<dyn ProgressRepository>,
    minigame_repo: Arc<dyn MinigameRepository>,
    buyer_repo: Arc<dyn BuyerRepository>,
    seller_repo: Arc<dyn SellerRepository>,
    product_repo: Arc<dyn ProductRepository>,
    order_repo: Arc<dyn OrderRepository>,
    message_repo: Arc<dyn MessageRepository>,
    passkey_repo: Arc<dyn PasskeyRepository>,
    flow_store: Arc<dyn FlowStore>,
    image_store: Arc<dyn ImageStore>,
    mailer: Arc<dyn Mailer>,
    mpesa_gateway: Arc<dyn MpesaGateway>,
    stripe_gateway: Arc<dyn StripeGateway>,
    webauthn: Arc<Webauthn>,
    flag_limiter: Arc<RateLimiter>,
}

impl AppServices {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        challenge_repo: Arc<dyn ChallengeRepository>,
        progress_repo: Arc<dyn ProgressRepository>,
        minigame_repo: Arc<dyn MinigameRepository>,
        buyer_repo: Arc<dyn BuyerRepository>,
        seller_repo: Arc<dyn SellerRepository>,
        product_repo: Arc<dyn ProductRepository>,
        order_repo: Arc<dyn OrderRepository>,
        message_repo: Arc<dyn MessageRepository>,
        passkey_repo: Arc<dyn PasskeyRepository>,
        flow_store: Arc<dyn FlowStore>,
        image_store: Arc<dyn ImageStore>,
        mailer: Arc<dyn Mailer>,
        mpesa_gateway: Arc<dyn MpesaGateway>,
        stripe_gateway: Arc<dyn StripeGateway>,
        webauthn: Arc<Webauthn>,
        flag_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
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
            flow_store,
            image_store,
            mailer,
            mpesa_gateway,
            stripe_gateway,
            webauthn,
            flag_limiter,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn challenge_repo(&self) -> Arc<dyn ChallengeRepository> {
        self.services.challenge_repo.clone()
    }

    pub fn progress_repo(&self) -> Arc<dyn ProgressRepository> {
        self.services.progress_repo.clone()
    }

    pub fn minigame_repo(&self) -> Arc<dyn MinigameRepository> {
        self.services.minigame_repo.clone()
    }

    pub fn buyer_repo(&self) -> Arc<dyn BuyerRepository> {
        self.services.buyer_repo.clone()
    }

    pub fn seller_repo(&self) -> Arc<dyn SellerRepository> {
        self.services.seller_repo.clone()
    }

    pub fn product_repo(&self) -> Arc<dyn ProductRepository> {
        self.services.product_repo.clone()
    }

    pub fn order_repo(&self) -> Arc<dyn OrderRepository> {
        self.services.order_repo.clone()
    }

    pub fn message_repo(&self) -> Arc<dyn MessageRepository> {
        self.services.message_repo.clone()
    }

    pub fn passkey_repo(&self) -> Arc<dyn PasskeyRepository> {
        self.services.passkey_repo.clone()
    }

    pub fn flow_store(&self) -> Arc<dyn FlowStore> {
        self.services.flow_store.clone()
    }

    pub fn image_store(&self) -> Arc<dyn ImageStore> {
        self.services.image_store.clone()
    }

    pub fn mailer(&self) -> Arc<dyn Mailer> {
        self.services.mailer.clone()
    }

    pub fn mpesa_gateway(&self) -> Arc<dyn MpesaGateway> {
        self.services.mpesa_gateway.clone()
    }

    pub fn stripe_gateway(&self) -> Arc<dyn StripeGateway> {
        self.services.stripe_gateway.clone()
    }

    pub fn webauthn(&self) -> Arc<Webauthn> {
        self.services.webauthn.clone()
    }

    pub fn flag_limiter(&self) -> Arc<RateLimiter> {
        self.services.flag_limiter.clone()
    }
}

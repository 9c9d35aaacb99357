pub mod buyer_repository;
pub mod challenge_repository;
pub mod flow_store;
pub mod image_store;
pub mod mailer;
pub mod message_repository;
pub mod minigame_repository;
pub mod mpesa_gateway;
pub mod order_repository;
pub mod passkey_repository;
pub mod product_repository;
pub mod progress_repository;
pub mod seller_repository;
pub mod stripe_gateway;
pub mod user_repository;

pub mod buyer_repository_sqlx;
pub mod challenge_repository_sqlx;
pub mod message_repository_sqlx;
pub mod minigame_repository_sqlx;
pub mod order_repository_sqlx;
pub mod passkey_repository_sqlx;
pub mod product_repository_sqlx;
pub mod progress_repository_sqlx;
pub mod seller_repository_sqlx;
pub mod user_repository_sqlx;

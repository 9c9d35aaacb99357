pub mod admin;
pub mod auth;
pub mod challenges;
pub mod marketplace;
pub mod messages;
pub mod minigames;
pub mod orders;
pub mod passkeys;

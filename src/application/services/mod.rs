pub mod challenges;
pub mod emails;
pub mod images;
pub mod minigames;
pub mod payments;
pub mod rate_limit;

pub mod complete_round;
pub mod hub;
pub mod overview;
pub mod start_round;

pub mod get_challenge;
pub mod list_challenges;
pub mod submit_flag;
pub mod take_hint;

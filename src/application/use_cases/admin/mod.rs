pub mod create_challenge;
pub mod deactivate_challenge;
pub mod list_users;
pub mod set_user_active;

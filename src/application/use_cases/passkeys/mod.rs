pub mod finish_enroll;
pub mod finish_login;
pub mod remove;
pub mod start_enroll;
pub mod start_login;

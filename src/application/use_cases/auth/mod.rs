pub mod forgot_password;
pub mod login;
pub mod me;
pub mod register;
pub mod resend_verification;
pub mod reset_password;
pub mod tokens;
pub mod verify_email;

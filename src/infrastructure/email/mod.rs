pub mod brevo;
pub mod noop;

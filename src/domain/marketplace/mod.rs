pub mod order;
pub mod verification;

pub mod daraja;
pub mod stripe;

pub mod db;
pub mod email;
pub mod flows;
pub mod payments;
pub mod storage;
pub mod webauthn;

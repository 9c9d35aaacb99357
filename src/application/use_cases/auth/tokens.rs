use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;

/// URL-safe random token for email verification and password reset links.
pub fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub fn verification_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::hours(24)
}

pub fn reset_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::hours(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_url_safe_and_distinct() {
        let a = new_token();
        let b = new_token();
        assert_ne!(a, b);
        assert!(a.len() >= 40);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn expiries_are_ordered() {
        assert!(reset_expiry() < verification_expiry());
        assert!(reset_expiry() > Utc::now());
    }
}

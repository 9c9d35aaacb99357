use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Field rules for the Daraja STK push payload.
pub const ACCOUNT_REFERENCE_MAX: usize = 12;
pub const TRANSACTION_DESC_MAX: usize = 13;

/// Normalizes a Kenyan phone number to `254XXXXXXXXX`.
/// Handles `0712...`, `+254712...`, `254712...` and bare `712...` inputs.
pub fn normalize_phone(phone: &str) -> String {
    let cleaned: String = phone
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if let Some(rest) = cleaned.strip_prefix('0') {
        format!("254{rest}")
    } else if cleaned.starts_with("254") {
        cleaned.to_string()
    } else {
        format!("254{cleaned}")
    }
}

/// True when the normalized number looks like a Safaricom MSISDN.
pub fn phone_is_plausible(normalized: &str) -> bool {
    normalized.len() == 12
        && normalized.starts_with("254")
        && normalized.chars().all(|c| c.is_ascii_digit())
}

pub fn account_reference(order_id: &uuid::Uuid) -> String {
    let short = order_id.simple().to_string();
    format!("ORD{}", &short[..9.min(short.len())])
}

pub fn clamp_reference(reference: &str) -> String {
    reference.chars().take(ACCOUNT_REFERENCE_MAX).collect()
}

pub fn clamp_description(description: &str) -> String {
    description.chars().take(TRANSACTION_DESC_MAX).collect()
}

/// Verifies a `Stripe-Signature` header (`t=<unix>,v1=<hex>,...`) against
/// the raw body: HMAC-SHA256 over `"{t}.{body}"` with the endpoint secret,
/// constant-time comparison, timestamps older than five minutes rejected.
pub fn verify_stripe_signature(secret: &str, header: &str, payload: &str, now_unix: i64) -> bool {
    const TOLERANCE_SECS: i64 = 300;
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => timestamp = v.parse().ok(),
            Some(("v1", v)) => signatures.push(v),
            _ => {}
        }
    }
    let Some(t) = timestamp else {
        return false;
    };
    if (now_unix - t).abs() > TOLERANCE_SECS {
        return false;
    }
    let signed_payload = format!("{t}.{payload}");
    for candidate in signatures {
        let Some(bytes) = decode_hex(candidate) else {
            continue;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(signed_payload.as_bytes());
        if mac.verify_slice(&bytes).is_ok() {
            return true;
        }
    }
    false
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, payload: &str, t: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{t}.{payload}").as_bytes());
        let hex: String = mac
            .finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        format!("t={t},v1={hex}")
    }

    #[test]
    fn normalizes_the_common_kenyan_formats() {
        assert_eq!(normalize_phone("0712345678"), "254712345678");
        assert_eq!(normalize_phone("+254712345678"), "254712345678");
        assert_eq!(normalize_phone("254712345678"), "254712345678");
        assert_eq!(normalize_phone("712345678"), "254712345678");
        assert_eq!(normalize_phone(" 0712 345-678 "), "254712345678");
    }

    #[test]
    fn plausibility_checks_shape_only() {
        assert!(phone_is_plausible("254712345678"));
        assert!(!phone_is_plausible("25471234567"));
        assert!(!phone_is_plausible("255712345678"));
        assert!(!phone_is_plausible("2547123456ab"));
    }

    #[test]
    fn daraja_field_limits_hold() {
        let id = uuid::Uuid::new_v4();
        assert!(account_reference(&id).len() <= ACCOUNT_REFERENCE_MAX);
        assert_eq!(clamp_reference("ABCDEFGHIJKLMNOP"), "ABCDEFGHIJKL");
        assert_eq!(clamp_description("Momento order payment"), "Momento order");
    }

    #[test]
    fn valid_signature_verifies() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let header = sign("whsec_test", payload, 1_700_000_000);
        assert!(verify_stripe_signature(
            "whsec_test",
            &header,
            payload,
            1_700_000_010
        ));
    }

    #[test]
    fn wrong_secret_fails() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let header = sign("whsec_other", payload, 1_700_000_000);
        assert!(!verify_stripe_signature(
            "whsec_test",
            &header,
            payload,
            1_700_000_010
        ));
    }

    #[test]
    fn stale_timestamp_fails() {
        let payload = "{}";
        let header = sign("whsec_test", payload, 1_700_000_000);
        assert!(!verify_stripe_signature(
            "whsec_test",
            &header,
            payload,
            1_700_000_000 + 301
        ));
    }

    #[test]
    fn tampered_payload_fails() {
        let header = sign("whsec_test", r#"{"amount":100}"#, 1_700_000_000);
        assert!(!verify_stripe_signature(
            "whsec_test",
            &header,
            r#"{"amount":999}"#,
            1_700_000_010
        ));
    }

    #[test]
    fn malformed_header_fails() {
        assert!(!verify_stripe_signature("s", "", "{}", 0));
        assert!(!verify_stripe_signature("s", "t=abc,v1=zz", "{}", 0));
        assert!(!verify_stripe_signature("s", "v1=aabb", "{}", 0));
    }
}

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use crate::domain::challenges::challenge::{ChallengeKind, Difficulty, LayeredMessage};

pub mod cipher;

pub static FLAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^FLAG\{[A-Za-z0-9_]+\}$").unwrap());

const AES_KEY_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const AES_KEY_LEN: usize = 20;
const VIGENERE_KEY_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const VIGENERE_KEY_LEN: usize = 10;
const FLAG_BODY_LEN: usize = 16;

#[derive(Debug, Clone)]
pub struct GeneratedChallenge {
    pub description: String,
    pub points: i32,
    pub hints: Vec<String>,
    pub encrypted_message: String,
    pub flag: String,
}

/// Builds a fresh challenge: random flag, random key material, and the
/// ciphertext in the layered `TAG:KEY:PAYLOAD` form.
pub fn generate(kind: ChallengeKind, difficulty: Difficulty) -> anyhow::Result<GeneratedChallenge> {
    let mut rng = rand::thread_rng();
    let flag = new_flag(&mut rng);
    let message = secret_message(&flag);

    let (key, payload, description, hints) = match kind {
        ChallengeKind::Aes => {
            let key = random_string(&mut rng, AES_KEY_CHARS, AES_KEY_LEN);
            let payload = cipher::aes_seal(&key, &message)?;
            let description = format!(
                "An intercepted note was sealed with AES-256-GCM. Its {AES_KEY_LEN}-character \
                 key is scattered across the minigames; reassemble it to open the note."
            );
            let hints = vec![
                "The payload is nonce and ciphertext, both base64, joined by a colon.".to_string(),
                "The cipher key is the SHA-256 digest of the revealed key string.".to_string(),
                "Every minigame you finish reveals another slice of the key.".to_string(),
            ];
            (key, payload, description, hints)
        }
        ChallengeKind::Vigenere => {
            let key = random_string(&mut rng, VIGENERE_KEY_CHARS, VIGENERE_KEY_LEN);
            let payload = cipher::vigenere_encrypt(&key, &message);
            let description = format!(
                "A classical Vigenere cipher guards this dispatch. The keyword is \
                 {VIGENERE_KEY_LEN} letters; earn it through the minigames or break it the old way."
            );
            let hints = vec![
                "Only ASCII letters are shifted; case and punctuation survive.".to_string(),
                format!("The keyword is exactly {VIGENERE_KEY_LEN} letters long."),
                "Short keyword plus long ciphertext means frequency analysis works.".to_string(),
            ];
            (key, payload, description, hints)
        }
        ChallengeKind::Rsa => {
            let kp = cipher::rsa_generate(&mut rng);
            let payload = cipher::rsa_encrypt(kp.n, kp.e, &message);
            let description = format!(
                "Textbook RSA, one byte per block. Public key: n = {}, e = {}. \
                 The private exponent d doubles as the recovery key.",
                kp.n, kp.e
            );
            let hints = vec![
                "Each plaintext byte was encrypted as its own block.".to_string(),
                "n fits in 64 bits; factoring it by hand is entirely feasible.".to_string(),
                "The recovery key is the private exponent d, written in decimal.".to_string(),
            ];
            (kp.d.to_string(), payload, description, hints)
        }
    };

    let layered = LayeredMessage { kind, key, payload };
    Ok(GeneratedChallenge {
        description,
        points: difficulty.points(),
        hints,
        encrypted_message: layered.to_string(),
        flag,
    })
}

pub fn looks_like_flag(submitted: &str) -> bool {
    FLAG_RE.is_match(submitted.trim())
}

pub fn flags_match(submitted: &str, expected: &str) -> bool {
    submitted.trim() == expected
}

fn secret_message(flag: &str) -> String {
    format!(
        "Good work, agent. The flag you are after is {flag}. Submit it before the trail goes cold."
    )
}

fn new_flag(rng: &mut impl Rng) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let body: String = (0..FLAG_BODY_LEN)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect();
    format!("FLAG{{{body}}}")
}

fn random_string(rng: &mut impl Rng, charset: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_flags_fit_the_format() {
        let r#gen = generate(ChallengeKind::Aes, Difficulty::Easy).unwrap();
        assert!(looks_like_flag(&r#gen.flag));
        assert!(looks_like_flag(" FLAG{abc_123} "));
        assert!(!looks_like_flag("flag{abc}"));
        assert!(!looks_like_flag("FLAG{spaces not allowed}"));
    }

    #[test]
    fn aes_challenge_opens_with_embedded_key() {
        let r#gen = generate(ChallengeKind::Aes, Difficulty::Easy).unwrap();
        let layered = LayeredMessage::parse(&r#gen.encrypted_message).unwrap();
        assert_eq!(layered.kind, ChallengeKind::Aes);
        assert_eq!(layered.key.len(), AES_KEY_LEN);
        let plain = cipher::aes_open(&layered.key, &layered.payload).unwrap();
        assert!(plain.contains(&r#gen.flag));
        assert_eq!(r#gen.points, 100);
    }

    #[test]
    fn vigenere_challenge_decrypts_with_embedded_key() {
        let r#gen = generate(ChallengeKind::Vigenere, Difficulty::Medium).unwrap();
        let layered = LayeredMessage::parse(&r#gen.encrypted_message).unwrap();
        assert_eq!(layered.kind, ChallengeKind::Vigenere);
        assert_eq!(layered.key.len(), VIGENERE_KEY_LEN);
        let plain = cipher::vigenere_decrypt(&layered.key, &layered.payload);
        assert!(plain.contains(&r#gen.flag));
        assert_eq!(r#gen.points, 250);
    }

    #[test]
    fn rsa_challenge_decrypts_with_private_exponent() {
        let r#gen = generate(ChallengeKind::Rsa, Difficulty::Hard).unwrap();
        let layered = LayeredMessage::parse(&r#gen.encrypted_message).unwrap();
        assert_eq!(layered.kind, ChallengeKind::Rsa);
        let n: u64 = {
            let re = Regex::new(r"n = (\d+)").unwrap();
            re.captures(&r#gen.description).unwrap()[1].parse().unwrap()
        };
        let d: u64 = layered.key.parse().unwrap();
        let plain = cipher::rsa_decrypt(n, d, &layered.payload).unwrap();
        assert!(plain.contains(&r#gen.flag));
        assert_eq!(r#gen.points, 500);
    }

    #[test]
    fn flag_comparison_trims_but_stays_exact() {
        assert!(flags_match("  FLAG{abc}  ", "FLAG{abc}"));
        assert!(!flags_match("FLAG{ABC}", "FLAG{abc}"));
    }
}

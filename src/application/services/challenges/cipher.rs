use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

fn derive_key(key_text: &str) -> Key<Aes256Gcm> {
    let mut hasher = Sha256::new();
    hasher.update(key_text.as_bytes());
    let out = hasher.finalize();
    let mut k = [0u8; 32];
    k.copy_from_slice(&out);
    Key::<Aes256Gcm>::from_slice(&k).clone()
}

/// Seals with AES-256-GCM under a key derived from `key_text`.
/// Output is `nonce_b64:ct_b64`.
pub fn aes_seal(key_text: &str, plaintext: &str) -> anyhow::Result<String> {
    let key = derive_key(key_text);
    let cipher = Aes256Gcm::new(&key);
    let mut nonce_bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let ct = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| anyhow::anyhow!("encrypt failed: {}", e))?;
    let n_b64 = base64::engine::general_purpose::STANDARD.encode(nonce_bytes);
    let c_b64 = base64::engine::general_purpose::STANDARD.encode(ct);
    Ok(format!("{}:{}", n_b64, c_b64))
}

pub fn aes_open(key_text: &str, payload: &str) -> anyhow::Result<String> {
    let parts: Vec<&str> = payload.splitn(2, ':').collect();
    if parts.len() != 2 {
        anyhow::bail!("invalid payload format");
    }
    let nonce_bytes = base64::engine::general_purpose::STANDARD
        .decode(parts[0])
        .map_err(|e| anyhow::anyhow!("b64 decode nonce: {}", e))?;
    let ct_bytes = base64::engine::general_purpose::STANDARD
        .decode(parts[1])
        .map_err(|e| anyhow::anyhow!("b64 decode ct: {}", e))?;
    if nonce_bytes.len() != 12 {
        anyhow::bail!("invalid nonce length");
    }
    let key = derive_key(key_text);
    let cipher = Aes256Gcm::new(&key);
    let nonce = Nonce::from_slice(&nonce_bytes);
    let pt = cipher
        .decrypt(nonce, ct_bytes.as_ref())
        .map_err(|e| anyhow::anyhow!("decrypt failed: {}", e))?;
    Ok(String::from_utf8(pt)?)
}

/// Classic Vigenere. Only ASCII letters are shifted; everything else
/// passes through, and case is preserved.
pub fn vigenere_encrypt(key: &str, plaintext: &str) -> String {
    vigenere_shift(key, plaintext, true)
}

pub fn vigenere_decrypt(key: &str, ciphertext: &str) -> String {
    vigenere_shift(key, ciphertext, false)
}

fn vigenere_shift(key: &str, text: &str, forward: bool) -> String {
    let shifts: Vec<u8> = key
        .bytes()
        .filter(|b| b.is_ascii_alphabetic())
        .map(|b| b.to_ascii_uppercase() - b'A')
        .collect();
    if shifts.is_empty() {
        return text.to_string();
    }
    let mut i = 0usize;
    text.chars()
        .map(|c| {
            if c.is_ascii_alphabetic() {
                let base = if c.is_ascii_uppercase() { b'A' } else { b'a' };
                let s = shifts[i % shifts.len()];
                i += 1;
                let offset = c as u8 - base;
                let shifted = if forward {
                    (offset + s) % 26
                } else {
                    (offset + 26 - s) % 26
                };
                (base + shifted) as char
            } else {
                c
            }
        })
        .collect()
}

/// Deliberately small textbook RSA: 16-bit primes, one block per byte.
/// The point is a factorable challenge, not real security.
#[derive(Debug, Clone, Copy)]
pub struct RsaKeyPair {
    pub n: u64,
    pub e: u64,
    pub d: u64,
}

pub fn rsa_generate(rng: &mut impl Rng) -> RsaKeyPair {
    loop {
        let p = random_prime(rng);
        let q = random_prime(rng);
        if p == q {
            continue;
        }
        let n = p * q;
        let phi = (p - 1) * (q - 1);
        let e = 65537u64;
        if gcd(e, phi) != 1 {
            continue;
        }
        if let Some(d) = modinv(e, phi) {
            return RsaKeyPair { n, e, d };
        }
    }
}

pub fn rsa_encrypt(n: u64, e: u64, plaintext: &str) -> String {
    plaintext
        .bytes()
        .map(|b| modpow(b as u64, e, n).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn rsa_decrypt(n: u64, d: u64, payload: &str) -> anyhow::Result<String> {
    let mut out = Vec::new();
    for token in payload.split_whitespace() {
        let c: u64 = token
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid block: {}", token))?;
        let m = modpow(c, d, n);
        if m > 255 {
            anyhow::bail!("block decrypts outside byte range");
        }
        out.push(m as u8);
    }
    Ok(String::from_utf8(out)?)
}

pub fn modpow(base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let m = modulus as u128;
    let mut result: u128 = 1;
    let mut b = (base as u128) % m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * b % m;
        }
        b = b * b % m;
        exp >>= 1;
    }
    result as u64
}

fn modinv(a: u64, m: u64) -> Option<u64> {
    let (mut old_r, mut r) = (a as i128, m as i128);
    let (mut old_s, mut s) = (1i128, 0i128);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    if old_r != 1 {
        return None;
    }
    let mut inv = old_s % (m as i128);
    if inv < 0 {
        inv += m as i128;
    }
    Some(inv as u64)
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn random_prime(rng: &mut impl Rng) -> u64 {
    loop {
        let candidate = rng.gen_range((1u64 << 15)..(1u64 << 16)) | 1;
        if is_prime(candidate) {
            return candidate;
        }
    }
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut i = 3u64;
    while i * i <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes_seal_open_round_trip() {
        let sealed = aes_seal("K7Q2M9X4L1P8Z3W6N5R0", "the flag is inside").unwrap();
        let opened = aes_open("K7Q2M9X4L1P8Z3W6N5R0", &sealed).unwrap();
        assert_eq!(opened, "the flag is inside");
    }

    #[test]
    fn aes_open_rejects_wrong_key() {
        let sealed = aes_seal("RIGHTKEY", "secret").unwrap();
        assert!(aes_open("WRONGKEY", &sealed).is_err());
    }

    #[test]
    fn vigenere_matches_known_vector() {
        assert_eq!(vigenere_encrypt("KEY", "HELLO"), "RIJVS");
        assert_eq!(vigenere_decrypt("KEY", "RIJVS"), "HELLO");
    }

    #[test]
    fn vigenere_leaves_non_letters_and_case_alone() {
        let ct = vigenere_encrypt("CIPHERTEXT", "Flag: FLAG{x_1}!");
        assert_eq!(vigenere_decrypt("CIPHERTEXT", &ct), "Flag: FLAG{x_1}!");
        assert_eq!(ct.chars().filter(|c| *c == '{').count(), 1);
        assert!(ct.contains(": "));
    }

    #[test]
    fn modpow_and_modinv_match_textbook_example() {
        // p=61, q=53, n=3233, phi=3120, e=17 -> d=2753
        assert_eq!(modinv(17, 3120), Some(2753));
        assert_eq!(modpow(65, 17, 3233), 2790);
        assert_eq!(modpow(2790, 2753, 3233), 65);
    }

    #[test]
    fn rsa_round_trips_generated_keys() {
        let mut rng = rand::thread_rng();
        let kp = rsa_generate(&mut rng);
        assert!(kp.n > (1u64 << 30));
        let ct = rsa_encrypt(kp.n, kp.e, "FLAG{rsa_byte_blocks}");
        let pt = rsa_decrypt(kp.n, kp.d, &ct).unwrap();
        assert_eq!(pt, "FLAG{rsa_byte_blocks}");
    }

    #[test]
    fn rsa_decrypt_rejects_garbage() {
        assert!(rsa_decrypt(3233, 2753, "12 notanumber").is_err());
    }
}

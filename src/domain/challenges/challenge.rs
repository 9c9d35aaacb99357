use std::fmt;

/// Cipher family a challenge is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeKind {
    Aes,
    Vigenere,
    Rsa,
}

impl ChallengeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeKind::Aes => "aes",
            ChallengeKind::Vigenere => "vigenere",
            ChallengeKind::Rsa => "rsa",
        }
    }

    /// Uppercase tag used as the first segment of a layered message.
    pub fn layer_tag(&self) -> &'static str {
        match self {
            ChallengeKind::Aes => "AES",
            ChallengeKind::Vigenere => "VIGENERE",
            ChallengeKind::Rsa => "RSA",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aes" => Some(ChallengeKind::Aes),
            "vigenere" => Some(ChallengeKind::Vigenere),
            "rsa" => Some(ChallengeKind::Rsa),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn points(&self) -> i32 {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Medium => 250,
            Difficulty::Hard => 500,
        }
    }
}

/// A challenge ciphertext in the layered `TAG:KEY:PAYLOAD` form.
///
/// The middle segment is the recovery key that the minigames reveal piece
/// by piece; the payload encoding depends on the cipher family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayeredMessage {
    pub kind: ChallengeKind,
    pub key: String,
    pub payload: String,
}

impl LayeredMessage {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, ':');
        let tag = parts.next()?;
        let key = parts.next()?;
        let payload = parts.next()?;
        let kind = ChallengeKind::parse(tag)?;
        if key.is_empty() || payload.is_empty() {
            return None;
        }
        Some(Self {
            kind,
            key: key.to_string(),
            payload: payload.to_string(),
        })
    }
}

impl fmt::Display for LayeredMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.kind.layer_tag(), self.key, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layered_message_round_trips() {
        let msg = LayeredMessage {
            kind: ChallengeKind::Aes,
            key: "K7Q2M9X4L1P8Z3W6N5R0".into(),
            payload: "c29tZSBiYXNlNjQ=".into(),
        };
        let parsed = LayeredMessage::parse(&msg.to_string()).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn layered_message_keeps_colons_in_payload() {
        let parsed = LayeredMessage::parse("RSA:12345:67 89:10").unwrap();
        assert_eq!(parsed.key, "12345");
        assert_eq!(parsed.payload, "67 89:10");
    }

    #[test]
    fn layered_message_rejects_unknown_tag_or_empty_parts() {
        assert!(LayeredMessage::parse("ROT13:abc:def").is_none());
        assert!(LayeredMessage::parse("AES::def").is_none());
        assert!(LayeredMessage::parse("AES:abc").is_none());
    }

    #[test]
    fn difficulty_orders_and_scores() {
        assert!(Difficulty::Easy < Difficulty::Hard);
        assert_eq!(Difficulty::parse("MEDIUM"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::Medium.points(), 250);
    }
}

use crate::domain::challenges::challenge::Difficulty;

/// Marketplace access tiers earned by solving challenges. Buyers qualify
/// on easy solves, sellers on hard ones; the thresholds are config knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationTier {
    Buyer,
    Seller,
}

impl VerificationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationTier::Buyer => "buyer",
            VerificationTier::Seller => "seller",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "buyer" => Some(VerificationTier::Buyer),
            "seller" => Some(VerificationTier::Seller),
            _ => None,
        }
    }

    /// Difficulty whose solves count toward this tier.
    pub fn difficulty(&self) -> Difficulty {
        match self {
            VerificationTier::Buyer => Difficulty::Easy,
            VerificationTier::Seller => Difficulty::Hard,
        }
    }
}

/// Verification is derived from solve counts, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationProgress {
    pub solved: i64,
    pub required: i64,
}

impl VerificationProgress {
    pub fn verified(&self) -> bool {
        self.solved >= self.required
    }

    /// True exactly when this solve pushed the count over the line.
    pub fn just_crossed(&self) -> bool {
        self.solved == self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_map_to_their_difficulty() {
        assert_eq!(VerificationTier::Buyer.difficulty(), Difficulty::Easy);
        assert_eq!(VerificationTier::Seller.difficulty(), Difficulty::Hard);
        assert_eq!(VerificationTier::parse("BUYER"), Some(VerificationTier::Buyer));
        assert_eq!(VerificationTier::parse("vendor"), None);
    }

    #[test]
    fn progress_thresholds() {
        let below = VerificationProgress { solved: 2, required: 3 };
        let at = VerificationProgress { solved: 3, required: 3 };
        let past = VerificationProgress { solved: 4, required: 3 };
        assert!(!below.verified());
        assert!(at.verified() && at.just_crossed());
        assert!(past.verified() && !past.just_crossed());
    }
}

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct RateDecision {
    pub allowed: bool,
    pub retry_after_secs: u64,
}

/// Sliding-window limiter keyed by caller-chosen strings (user id plus
/// action). Timestamps older than the window are pruned on each check,
/// so memory stays bounded by active keys times the per-window cap.
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    hits: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Records a hit when allowed and reports the decision.
    pub fn check(&self, key: &str) -> RateDecision {
        let now = Instant::now();
        let mut hits = self.hits.lock().unwrap_or_else(|p| p.into_inner());
        let entry = hits.entry(key.to_string()).or_default();
        entry.retain(|t| now.duration_since(*t) < self.window);
        if entry.len() >= self.max_requests {
            let retry_after_secs = entry
                .first()
                .map(|oldest| (*oldest + self.window).saturating_duration_since(now))
                .map(|d| d.as_secs().max(1))
                .unwrap_or(1);
            return RateDecision {
                allowed: false,
                retry_after_secs,
            };
        }
        entry.push(now);
        RateDecision {
            allowed: true,
            retry_after_secs: 0,
        }
    }

    /// Drops keys whose every hit has aged out of the window.
    pub fn purge(&self) -> usize {
        let now = Instant::now();
        let mut hits = self.hits.lock().unwrap_or_else(|p| p.into_inner());
        let before = hits.len();
        hits.retain(|_, stamps| {
            stamps.retain(|t| now.duration_since(*t) < self.window);
            !stamps.is_empty()
        });
        before - hits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_cap_then_denies() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 3);
        assert!(limiter.check("u1:flag").allowed);
        assert!(limiter.check("u1:flag").allowed);
        assert!(limiter.check("u1:flag").allowed);
        let denied = limiter.check("u1:flag");
        assert!(!denied.allowed);
        assert!(denied.retry_after_secs >= 1);
        // other keys are unaffected
        assert!(limiter.check("u2:flag").allowed);
    }

    #[test]
    fn window_expiry_frees_the_budget() {
        let limiter = RateLimiter::new(Duration::from_millis(40), 1);
        assert!(limiter.check("u1:flag").allowed);
        assert!(!limiter.check("u1:flag").allowed);
        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.check("u1:flag").allowed);
    }

    #[test]
    fn purge_drops_idle_keys() {
        let limiter = RateLimiter::new(Duration::from_millis(10), 5);
        limiter.check("gone");
        std::thread::sleep(Duration::from_millis(25));
        assert_eq!(limiter.purge(), 1);
    }
}

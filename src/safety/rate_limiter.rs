//! Rate Limiter
//!
//! Limits analysis requests per client using a token bucket per client key.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Per-client rate limiter using the token bucket algorithm
pub struct RateLimiter {
    buckets: HashMap<String, TokenBucket>,
    max_tokens: u32,
    window: Duration,
}

struct TokenBucket {
    tokens: u32,
    max_tokens: u32,
    last_refill: Instant,
    refill_every: Duration,
}

impl TokenBucket {
    /// A full bucket that regains all `max_tokens` over one `window`.
    fn new(max_tokens: u32, window: Duration) -> Self {
        let max_tokens = max_tokens.max(1);
        Self {
            tokens: max_tokens,
            max_tokens,
            last_refill: Instant::now(),
            refill_every: window / max_tokens,
        }
    }

    fn try_consume(&mut self) -> bool {
        self.refill();
        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    fn refill(&mut self) {
        if self.refill_every.is_zero() {
            self.tokens = self.max_tokens;
            return;
        }
        let elapsed = self.last_refill.elapsed();
        let refills = (elapsed.as_secs_f64() / self.refill_every.as_secs_f64()) as u32;

        if refills > 0 {
            self.tokens = self.tokens.saturating_add(refills).min(self.max_tokens);
            self.last_refill = Instant::now();
        }
    }

    fn is_full(&mut self) -> bool {
        self.refill();
        self.tokens == self.max_tokens
    }
}

impl RateLimiter {
    pub fn new(max_tokens: u32, window: Duration) -> Self {
        Self {
            buckets: HashMap::new(),
            max_tokens,
            window,
        }
    }

    /// Check whether `client` may make another request
    pub fn check(&mut self, client: &str) -> bool {
        let (max_tokens, window) = (self.max_tokens, self.window);
        self.buckets
            .entry(client.to_string())
            .or_insert_with(|| TokenBucket::new(max_tokens, window))
            .try_consume()
    }

    /// Drop buckets that have fully refilled, keeping memory bounded by active clients
    pub fn prune(&mut self) {
        self.buckets.retain(|_, bucket| !bucket.is_full());
    }

    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }

    /// Reset all rate limiters
    pub fn reset(&mut self) {
        self.buckets.clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(30, Duration::from_secs(60))
    }
}

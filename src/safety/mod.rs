//! Safety Module
//!
//! Request guardrails for the HTTP surface.

mod rate_limiter;

pub use rate_limiter::RateLimiter;

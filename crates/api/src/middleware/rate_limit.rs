//! OTP issuance throttling.
//!
//! Caps how many codes one email address can trigger per hour, covering both
//! request and resend. Keyed by normalized email using governor's keyed
//! limiter.
//!
//! The key is caller-supplied and checked before eligibility, so the key map
//! is pruned of fully replenished entries once it grows past a threshold.

use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};

const PRUNE_THRESHOLD: usize = 10_000;

/// Per-email OTP rate limiter shared across requests.
pub struct OtpRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
    requests_per_hour: u32,
    prune_threshold: usize,
    next_prune_at: AtomicUsize,
}

impl OtpRateLimiter {
    /// Returns `None` when the limit is 0 (disabled).
    pub fn new(requests_per_hour: u32) -> Option<Self> {
        let per_hour = NonZeroU32::new(requests_per_hour)?;
        Some(Self::from_quota(
            Quota::per_hour(per_hour),
            requests_per_hour,
            PRUNE_THRESHOLD,
        ))
    }

    fn from_quota(quota: Quota, requests_per_hour: u32, prune_threshold: usize) -> Self {
        Self {
            limiter: RateLimiter::keyed(quota),
            clock: DefaultClock::default(),
            requests_per_hour,
            prune_threshold,
            next_prune_at: AtomicUsize::new(prune_threshold),
        }
    }

    pub fn requests_per_hour(&self) -> u32 {
        self.requests_per_hour
    }

    /// Check if another code may be issued to `email`.
    /// Returns Ok(()) if allowed, or Err with retry_after seconds if rate limited.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        if self.limiter.len() >= self.next_prune_at.load(Ordering::Relaxed) {
            self.prune();
        }

        match self.limiter.check_key(&email.to_string()) {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(self.clock.now());
                Err(wait_time.as_secs().max(1))
            }
        }
    }

    /// Drops keys whose quota has fully replenished.
    ///
    /// When most keys are still live the next prune is deferred until the
    /// map doubles, so a flood of fresh keys does not prune on every call.
    pub fn prune(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        let after = self.limiter.len();
        self.next_prune_at
            .store(self.prune_threshold.max(after * 2), Ordering::Relaxed);
        tracing::debug!(before, after, "Pruned OTP rate limiter keys");
    }

    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }
}

impl std::fmt::Debug for OtpRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpRateLimiter")
            .field("requests_per_hour", &self.requests_per_hour)
            .field("tracked_keys", &self.tracked_keys())
            .finish()
    }
}

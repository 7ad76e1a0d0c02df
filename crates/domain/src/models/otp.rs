//! One-time password models.

use chrono::{DateTime, Duration, Utc};

use super::account::Account;

/// Default validity window of an issued code.
pub const DEFAULT_OTP_TTL_SECS: i64 = 600;

/// Default number of wrong guesses before the outstanding code is dropped.
pub const DEFAULT_OTP_MAX_ATTEMPTS: u32 = 5;

/// A freshly issued code, handed to the notifier for delivery.
///
/// `email` doubles as the pending-verification marker the caller keeps in
/// its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedOtp {
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Proof that a code was verified. The code has already been cleared.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub account: Account,
}

/// Tunables for the OTP gate, passed in at construction.
#[derive(Debug, Clone)]
pub struct OtpPolicy {
    /// Accepted email domain suffixes.
    pub allowed_domains: Vec<String>,
    pub ttl: Duration,
    /// 0 disables the limit.
    pub max_attempts: u32,
}

impl OtpPolicy {
    pub fn new(allowed_domains: Vec<String>) -> Self {
        Self {
            allowed_domains,
            ttl: Duration::seconds(DEFAULT_OTP_TTL_SECS),
            max_attempts: DEFAULT_OTP_MAX_ATTEMPTS,
        }
    }

    pub fn with_ttl_secs(mut self, secs: i64) -> Self {
        self.ttl = Duration::seconds(secs);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }
}

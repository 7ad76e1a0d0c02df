//! OTP auth gate.
//!
//! Decides whether an email may receive a one-time code, issues codes with
//! an absolute expiry, and verifies submitted codes. Session state belongs
//! to the caller: `request_otp` returns the email to remember as the pending
//! verification marker and `verify_otp` takes it back.
//!
//! Eligibility is checked in this order, stopping at the first failure:
//! 1. email domain is allowed
//! 2. an account exists
//! 3. the account is approved
//! 4. the account is active
//!
//! A failed check changes no account state.

use std::sync::Arc;

use shared::validation::{has_allowed_domain, normalize_email};

use crate::errors::{EligibilityError, OtpError, VerifyError};
use crate::models::{Account, Authenticated, IssuedOtp, OtpPolicy};
use crate::services::clock::{Clock, SystemClock};
use crate::services::codes::{CodeGenerator, RandomDigits};
use crate::services::notification::OtpNotifier;
use crate::services::store::AccountStore;

/// Issues and verifies one-time login codes.
#[derive(Clone)]
pub struct OtpGate {
    store: Arc<dyn AccountStore>,
    notifier: Arc<dyn OtpNotifier>,
    clock: Arc<dyn Clock>,
    codes: Arc<dyn CodeGenerator>,
    policy: OtpPolicy,
}

impl OtpGate {
    pub fn new(
        store: Arc<dyn AccountStore>,
        notifier: Arc<dyn OtpNotifier>,
        policy: OtpPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            clock: Arc::new(SystemClock),
            codes: Arc::new(RandomDigits),
            policy,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_codes(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    /// Runs the eligibility checks and returns the account on success.
    pub async fn check_eligibility(&self, email: &str) -> Result<Account, OtpError> {
        let email = normalize_email(email);

        if !has_allowed_domain(&email, &self.policy.allowed_domains) {
            return Err(EligibilityError::InvalidDomain.into());
        }

        let account = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(EligibilityError::NotRegistered)?;

        if !account.is_approved {
            return Err(EligibilityError::PendingApproval.into());
        }
        if !account.is_active {
            return Err(EligibilityError::Deactivated.into());
        }

        Ok(account)
    }

    /// Issues a fresh code to an eligible account.
    pub async fn request_otp(&self, email: &str) -> Result<IssuedOtp, OtpError> {
        self.issue(email, "request").await
    }

    /// Re-runs eligibility and replaces any outstanding code.
    pub async fn resend_otp(&self, email: &str) -> Result<IssuedOtp, OtpError> {
        self.issue(email, "resend").await
    }

    async fn issue(&self, email: &str, trigger: &'static str) -> Result<IssuedOtp, OtpError> {
        let account = match self.check_eligibility(email).await {
            Ok(account) => account,
            Err(OtpError::Ineligible(reason)) => {
                tracing::info!(trigger, reason = reason.code(), "OTP issuance refused");
                return Err(reason.into());
            }
            Err(e) => return Err(e),
        };

        let code = self.codes.generate();
        let expires_at = self.clock.now() + self.policy.ttl;

        self.store.store_otp(account.id, &code, expires_at).await?;

        tracing::info!(
            account_id = %account.id,
            trigger,
            expires_at = %expires_at,
            "OTP issued"
        );

        self.notifier
            .deliver_otp(&account.email, &code, expires_at)
            .await?;

        Ok(IssuedOtp {
            email: account.email,
            code,
            expires_at,
        })
    }

    /// Checks `code` against the outstanding code for `email`.
    ///
    /// Expired codes are cleared when touched. A mismatch keeps the code for
    /// retry until the failed-attempt limit is reached, at which point the
    /// code is cleared. Success redeems the code atomically, so concurrent
    /// submissions of one code authenticate at most once.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<Authenticated, OtpError> {
        let email = normalize_email(email);

        let Some(mut account) = self.store.find_by_email(&email).await? else {
            tracing::info!(reason = "no_account", "OTP verification failed");
            return Err(VerifyError::NoPendingRequest.into());
        };

        let (Some(expected), Some(expires_at)) =
            (account.otp_code.clone(), account.otp_expires_at)
        else {
            tracing::info!(account_id = %account.id, reason = "no_pending_request", "OTP verification failed");
            return Err(VerifyError::NoPendingRequest.into());
        };

        let now = self.clock.now();
        if now > expires_at {
            self.store.discard_otp(account.id, &expected).await?;
            tracing::info!(account_id = %account.id, reason = "expired", "OTP verification failed");
            return Err(VerifyError::Expired.into());
        }

        if code.trim() != expected {
            let attempts = self.store.record_failed_attempt(account.id).await?;
            let max = self.policy.max_attempts;
            if max > 0 && attempts >= max as i32 {
                self.store.discard_otp(account.id, &expected).await?;
                tracing::warn!(
                    account_id = %account.id,
                    attempts,
                    "OTP attempt limit reached, code cleared"
                );
            } else {
                tracing::info!(account_id = %account.id, attempts, reason = "mismatch", "OTP verification failed");
            }
            return Err(VerifyError::Mismatch.into());
        }

        if !self.store.consume_otp(account.id, &expected, now).await? {
            tracing::info!(account_id = %account.id, reason = "already_consumed", "OTP verification failed");
            return Err(VerifyError::NoPendingRequest.into());
        }
        account.otp_code = None;
        account.otp_expires_at = None;
        account.otp_failed_attempts = 0;

        tracing::info!(account_id = %account.id, "OTP verified");
        Ok(Authenticated { account })
    }
}

//! Notification abstraction for OTP delivery.
//!
//! The OTP gate produces a code and hands it off; delivery itself lives in
//! the API layer (email).

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::errors::NotifyError;
use crate::models::IssuedOtp;

/// Delivers one-time codes to account holders.
#[async_trait::async_trait]
pub trait OtpNotifier: Send + Sync {
    /// Deliver `code` to `email`, valid until `expires_at`.
    async fn deliver_otp(
        &self,
        email: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), NotifyError>;
}

/// Mock notifier for development and testing.
///
/// Records every delivery instead of sending it.
#[derive(Debug, Default)]
pub struct MockOtpNotifier {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    delivered: Mutex<Vec<IssuedOtp>>,
}

impl MockOtpNotifier {
    /// Create a new mock notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock notifier that simulates failures.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Everything delivered so far, oldest first.
    pub fn delivered(&self) -> Vec<IssuedOtp> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    /// The most recent code sent to `email`.
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.delivered()
            .into_iter()
            .rev()
            .find(|d| d.email == email)
            .map(|d| d.code)
    }
}

#[async_trait::async_trait]
impl OtpNotifier for MockOtpNotifier {
    async fn deliver_otp(
        &self,
        email: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), NotifyError> {
        if self.simulate_failure {
            tracing::warn!(email = %email, "Mock notifier simulating failure");
            return Err(NotifyError("Simulated failure".to_string()));
        }

        tracing::info!(
            email = %email,
            expires_at = %expires_at,
            "Mock: Would deliver OTP"
        );

        if let Ok(mut delivered) = self.delivered.lock() {
            delivered.push(IssuedOtp {
                email: email.to_string(),
                code: code.to_string(),
                expires_at,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_notifier_records_delivery() {
        let notifier = MockOtpNotifier::new();
        notifier
            .deliver_otp("a@acme.com", "123456", Utc::now())
            .await
            .unwrap();
        notifier
            .deliver_otp("a@acme.com", "654321", Utc::now())
            .await
            .unwrap();

        assert_eq!(notifier.delivered().len(), 2);
        assert_eq!(notifier.last_code_for("a@acme.com").as_deref(), Some("654321"));
        assert!(notifier.last_code_for("b@acme.com").is_none());
    }

    #[tokio::test]
    async fn test_mock_notifier_failure() {
        let notifier = MockOtpNotifier::failing();
        let result = notifier.deliver_otp("a@acme.com", "123456", Utc::now()).await;
        assert!(result.is_err());
        assert!(notifier.delivered().is_empty());
    }
}

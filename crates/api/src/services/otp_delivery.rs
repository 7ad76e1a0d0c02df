//! Email-backed OTP delivery.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::errors::NotifyError;
use domain::services::OtpNotifier;

use super::email::{EmailMessage, EmailService};

/// Sends login codes through the configured email provider.
#[derive(Clone)]
pub struct EmailOtpNotifier {
    email: EmailService,
}

impl EmailOtpNotifier {
    pub fn new(email: EmailService) -> Self {
        Self { email }
    }
}

#[async_trait]
impl OtpNotifier for EmailOtpNotifier {
    async fn deliver_otp(
        &self,
        email: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), NotifyError> {
        if !self.email.is_enabled() {
            tracing::warn!(email = %email, "Email disabled, login code not delivered");
        }
        self.email
            .send(EmailMessage::login_code(email, code, expires_at))
            .await
            .map_err(|e| NotifyError(e.to_string()))
    }
}

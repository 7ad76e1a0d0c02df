//! Domain error types.

use thiserror::Error;

/// Failure reported by a backing store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Failure handing a code to the delivery channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Why an account may not receive a code.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum EligibilityError {
    #[error("email domain is not allowed")]
    InvalidDomain,

    #[error("no account is registered for this email")]
    NotRegistered,

    #[error("account has been deactivated")]
    Deactivated,

    #[error("account is pending admin approval")]
    PendingApproval,
}

impl EligibilityError {
    /// Stable reason code shown to callers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDomain => "invalid_domain",
            Self::NotRegistered => "not_registered",
            Self::Deactivated => "deactivated",
            Self::PendingApproval => "pending_approval",
        }
    }
}

/// Why a submitted code was refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("no code is pending for this account")]
    NoPendingRequest,

    #[error("code does not match")]
    Mismatch,

    #[error("code has expired")]
    Expired,
}

impl VerifyError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoPendingRequest => "no_pending_request",
            Self::Mismatch => "mismatch",
            Self::Expired => "expired",
        }
    }
}

/// Error returned by the OTP gate operations.
#[derive(Debug, Error)]
pub enum OtpError {
    #[error(transparent)]
    Ineligible(#[from] EligibilityError),

    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Delivery(#[from] NotifyError),
}

/// Batch-level ingestion failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IngestError {
    #[error("no column header could be mapped to a resource field")]
    UnmappableHeaders,

    #[error("sheet has no header row")]
    EmptySheet,

    #[error("failed to commit batch: {0}")]
    Commit(String),
}

/// Error returned by account administration.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("email domain is not allowed")]
    InvalidDomain,

    #[error("an account with this email already exists")]
    AlreadyRegistered,

    #[error("account not found")]
    NotFound,

    #[error("the super admin account cannot be deactivated or demoted")]
    SuperAdminProtected,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AdminError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AdminError::NotFound,
            StoreError::Conflict(_) => AdminError::AlreadyRegistered,
            other => AdminError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligibility_codes() {
        assert_eq!(EligibilityError::InvalidDomain.code(), "invalid_domain");
        assert_eq!(EligibilityError::NotRegistered.code(), "not_registered");
        assert_eq!(EligibilityError::Deactivated.code(), "deactivated");
        assert_eq!(EligibilityError::PendingApproval.code(), "pending_approval");
    }

    #[test]
    fn test_otp_error_from() {
        let err: OtpError = VerifyError::Expired.into();
        assert!(matches!(err, OtpError::Verify(VerifyError::Expired)));
        assert_eq!(err.to_string(), "code has expired");
    }

    #[test]
    fn test_admin_error_from_store() {
        assert!(matches!(
            AdminError::from(StoreError::Conflict("email".into())),
            AdminError::AlreadyRegistered
        ));
        assert!(matches!(
            AdminError::from(StoreError::Backend("down".into())),
            AdminError::Store(_)
        ));
    }
}

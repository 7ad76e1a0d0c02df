use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::errors::{AdminError, EligibilityError, OtpError, StoreError, VerifyError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Login refused with a stable reason code the client can act on.
    #[error("Login rejected ({code}): {message}")]
    LoginRejected {
        status: StatusCode,
        code: &'static str,
        message: String,
    },

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::LoginRejected {
                status,
                code,
                message,
            } => (*status, *code, message.clone()),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<EligibilityError> for ApiError {
    fn from(err: EligibilityError) -> Self {
        let (status, message) = match err {
            EligibilityError::InvalidDomain => (
                StatusCode::FORBIDDEN,
                "Only company email addresses can sign in.",
            ),
            EligibilityError::NotRegistered => (
                StatusCode::NOT_FOUND,
                "No account found for this email. Please register first.",
            ),
            EligibilityError::Deactivated => (
                StatusCode::FORBIDDEN,
                "Your account has been deactivated. Contact an administrator.",
            ),
            EligibilityError::PendingApproval => (
                StatusCode::FORBIDDEN,
                "Your account is pending admin approval.",
            ),
        };
        ApiError::LoginRejected {
            status,
            code: err.code(),
            message: message.to_string(),
        }
    }
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        // Mismatch and missing request are indistinguishable to the caller.
        let (code, message) = match err {
            VerifyError::Expired => ("code_expired", "The code has expired. Request a new one."),
            VerifyError::Mismatch | VerifyError::NoPendingRequest => {
                ("invalid_code", "Invalid code. Please try again.")
            }
        };
        ApiError::LoginRejected {
            status: StatusCode::UNAUTHORIZED,
            code,
            message: message.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Resource not found".into()),
            StoreError::Conflict(_) => ApiError::Conflict("Resource already exists".into()),
            StoreError::Backend(msg) => ApiError::Internal(format!("Store error: {}", msg)),
        }
    }
}

impl From<OtpError> for ApiError {
    fn from(err: OtpError) -> Self {
        match err {
            OtpError::Ineligible(e) => e.into(),
            OtpError::Verify(e) => e.into(),
            OtpError::Store(e) => e.into(),
            OtpError::Delivery(e) => {
                tracing::error!(error = %e, "OTP delivery failed");
                ApiError::ServiceUnavailable("Could not send the login code. Try again later.".into())
            }
        }
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::InvalidDomain => EligibilityError::InvalidDomain.into(),
            AdminError::AlreadyRegistered => {
                ApiError::Conflict("An account with this email already exists".into())
            }
            AdminError::NotFound => ApiError::NotFound("User not found".into()),
            AdminError::SuperAdminProtected => ApiError::Forbidden(
                "The super admin account cannot be deactivated or demoted".into(),
            ),
            AdminError::Store(e) => e.into(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => ApiError::Conflict("Resource already exists".into()),
                        "23503" => ApiError::NotFound("Referenced resource not found".into()),
                        _ => ApiError::Internal(format!("Database error: {}", db_err)),
                    }
                } else {
                    ApiError::Internal(format!("Database error: {}", db_err))
                }
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect();
        messages.sort();

        let message = if messages.len() == 1 {
            messages.remove(0)
        } else {
            format!("{} validation errors: {}", messages.len(), messages.join("; "))
        };

        ApiError::Validation(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_api_error_statuses() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            format!("{}", ApiError::Unauthorized("test".to_string())),
            "Unauthorized: test"
        );
        assert_eq!(format!("{}", ApiError::RateLimited), "Rate limited");
        assert_eq!(
            format!("{}", ApiError::Internal("test".to_string())),
            "Internal error: test"
        );
    }

    #[tokio::test]
    async fn test_eligibility_keeps_reason_code() {
        let (status, body) = body_json(EligibilityError::PendingApproval.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "pending_approval");

        let (status, body) = body_json(EligibilityError::NotRegistered.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_registered");
    }

    #[tokio::test]
    async fn test_verify_errors_are_generic() {
        let (_, mismatch) = body_json(VerifyError::Mismatch.into()).await;
        let (_, missing) = body_json(VerifyError::NoPendingRequest.into()).await;
        assert_eq!(mismatch, missing);
        assert_eq!(mismatch["error"], "invalid_code");

        let (status, expired) = body_json(VerifyError::Expired.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(expired["error"], "code_expired");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let (_, body) = body_json(StoreError::Backend("connection refused".into()).into()).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[test]
    fn test_admin_error_mapping() {
        assert!(matches!(
            ApiError::from(AdminError::SuperAdminProtected),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(AdminError::AlreadyRegistered),
            ApiError::Conflict(_)
        ));
    }

    #[test]
    fn test_from_sqlx_row_not_found() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        match error {
            ApiError::NotFound(msg) => assert_eq!(msg, "Resource not found"),
            _ => panic!("Expected NotFound error"),
        }
    }
}

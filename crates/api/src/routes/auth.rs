//! Authentication routes: registration and the email OTP login flow.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use domain::errors::OtpError;
use domain::models::{Account, IssuedOtp};
use serde::{Deserialize, Serialize};
use shared::validation::normalize_email;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::metrics::{record_otp_issued, record_otp_rejected};

/// Request body for self-registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: String,
}

/// Response body for registration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub account: Account,
}

/// Request body for OTP request and resend.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    #[validate(length(min = 1, max = 255, message = "Email is required"))]
    pub email: String,
}

/// Response body after a code was issued.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpIssuedResponse {
    pub message: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    /// Only present in dev mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Request body for OTP verification.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[validate(length(min = 1, max = 255, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, max = 16, message = "Code is required"))]
    pub code: String,
}

/// Response body after a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub account: Account,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new account. It stays pending until an admin approves it.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    request.validate()?;

    let account = state
        .account_admin
        .register(&request.email, &request.display_name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration received. An administrator must approve your account."
                .to_string(),
            account,
        }),
    ))
}

/// Send a login code to an eligible account.
///
/// POST /api/v1/auth/otp/request
pub async fn request_otp(
    State(state): State<AppState>,
    Json(request): Json<OtpRequest>,
) -> Result<Json<OtpIssuedResponse>, ApiError> {
    request.validate()?;
    throttle(&state, &request.email)?;

    let issued = state
        .otp_gate
        .request_otp(&request.email)
        .await
        .map_err(rejected)?;
    record_otp_issued("request");

    Ok(Json(issued_response(&state, issued, "Login code sent")))
}

/// Replace the outstanding code with a fresh one.
///
/// POST /api/v1/auth/otp/resend
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(request): Json<OtpRequest>,
) -> Result<Json<OtpIssuedResponse>, ApiError> {
    request.validate()?;
    throttle(&state, &request.email)?;

    let issued = state
        .otp_gate
        .resend_otp(&request.email)
        .await
        .map_err(rejected)?;
    record_otp_issued("resend");

    Ok(Json(issued_response(&state, issued, "New login code sent")))
}

/// Exchange a valid code for a session token.
///
/// POST /api/v1/auth/otp/verify
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    request.validate()?;

    let authenticated = state
        .otp_gate
        .verify_otp(&request.email, &request.code)
        .await
        .map_err(rejected)?;
    let mut account = authenticated.account;

    // Eligibility may have changed since the code was issued
    if !account.is_active {
        return Err(ApiError::Forbidden("Account has been deactivated".to_string()));
    }

    let now = Utc::now();
    state.accounts.record_login(account.id, now).await?;
    account.last_login_at = Some(now);

    let issued = state
        .sessions
        .issue(account.id, account.role.as_str())
        .map_err(|e| ApiError::Internal(format!("Token error: {}", e)))?;

    tracing::info!(account_id = %account.id, role = %account.role, "Session started");

    Ok(Json(SessionResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
        account,
    }))
}

/// Sessions are stateless; the client discards its token.
///
/// POST /api/v1/auth/logout
pub async fn logout(user: CurrentUser) -> Json<MessageResponse> {
    tracing::info!(account_id = %user.account.id, jti = %user.jti, "Logged out");
    Json(MessageResponse {
        message: "Logged out".to_string(),
    })
}

/// The signed-in account.
///
/// GET /api/v1/auth/me
pub async fn me(user: CurrentUser) -> Json<Account> {
    Json(user.account)
}

fn throttle(state: &AppState, email: &str) -> Result<(), ApiError> {
    let Some(limiter) = &state.otp_limiter else {
        return Ok(());
    };
    limiter.check(&normalize_email(email)).map_err(|retry_after| {
        tracing::warn!(retry_after, "OTP issuance throttled");
        record_otp_rejected("rate_limited");
        ApiError::RateLimited
    })
}

fn rejected(err: OtpError) -> ApiError {
    match &err {
        OtpError::Ineligible(e) => record_otp_rejected(e.code()),
        OtpError::Verify(e) => record_otp_rejected(e.code()),
        _ => {}
    }
    err.into()
}

fn issued_response(state: &AppState, issued: IssuedOtp, message: &str) -> OtpIssuedResponse {
    let code = if state.config.auth.dev_mode {
        tracing::info!(email = %issued.email, code = %issued.code, "Dev mode login code");
        Some(issued.code)
    } else {
        None
    };

    OtpIssuedResponse {
        message: message.to_string(),
        email: issued.email,
        expires_at: issued.expires_at,
        code,
    }
}

//! Session token authentication extractor.
//!
//! Validates the Bearer session token and loads the account behind it.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Account;
use shared::jwt::extract_account_id;

use crate::app::AppState;
use crate::error::ApiError;

/// The signed-in account.
///
/// Rejects missing, malformed or expired tokens, tokens for accounts that no
/// longer exist, and deactivated accounts.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub account: Account,
    /// Token ID (jti) of the session.
    pub jti: String,
}

impl CurrentUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.account.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }

    pub fn require_pmo(&self) -> Result<(), ApiError> {
        if self.account.is_pmo() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("PMO access required".to_string()))
        }
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = state
            .sessions
            .validate(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
        let account_id = extract_account_id(&claims)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        let account = state
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

        if !account.is_active {
            return Err(ApiError::Forbidden("Account has been deactivated".to_string()));
        }

        Ok(CurrentUser {
            account,
            jti: claims.jti,
        })
    }
}

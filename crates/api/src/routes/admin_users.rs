//! Admin account management routes.
//!
//! Every handler requires an admin session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{Account, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

/// Request body for admin-created accounts.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: String,

    #[serde(default)]
    pub role: Role,
}

/// Request body for role changes.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUsersResponse {
    pub data: Vec<Account>,
    pub total: usize,
}

/// GET /api/v1/admin/users/pending
pub async fn list_pending(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<PendingUsersResponse>, ApiError> {
    user.require_admin()?;

    let data = state.account_admin.list_pending().await?;
    Ok(Json(PendingUsersResponse {
        total: data.len(),
        data,
    }))
}

/// Create an approved account with the given role.
///
/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    user.require_admin()?;
    request.validate()?;

    let account = state
        .account_admin
        .create_account(&request.email, &request.display_name, request.role)
        .await?;

    tracing::info!(admin_id = %user.account.id, account_id = %account.id, "Admin created account");
    Ok((StatusCode::CREATED, Json(account)))
}

/// POST /api/v1/admin/users/:id/approve
pub async fn approve_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, ApiError> {
    user.require_admin()?;
    Ok(Json(state.account_admin.approve(id).await?))
}

/// POST /api/v1/admin/users/:id/activate
pub async fn activate_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, ApiError> {
    user.require_admin()?;
    Ok(Json(state.account_admin.activate(id).await?))
}

/// POST /api/v1/admin/users/:id/deactivate
pub async fn deactivate_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, ApiError> {
    user.require_admin()?;
    if id == user.account.id {
        return Err(ApiError::Forbidden("You cannot deactivate your own account".into()));
    }
    Ok(Json(state.account_admin.deactivate(id).await?))
}

/// PUT /api/v1/admin/users/:id/role
pub async fn change_role(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangeRoleRequest>,
) -> Result<Json<Account>, ApiError> {
    user.require_admin()?;
    Ok(Json(state.account_admin.change_role(id, request.role).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_defaults_to_resource() {
        let request: CreateUserRequest =
            serde_json::from_str(r#"{"email":"a@acme.com","displayName":"A"}"#).unwrap();
        assert_eq!(request.role, Role::Resource);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_change_role_request_rejects_unknown_role() {
        assert!(serde_json::from_str::<ChangeRoleRequest>(r#"{"role":"pmo"}"#).is_ok());
        assert!(serde_json::from_str::<ChangeRoleRequest>(r#"{"role":"owner"}"#).is_err());
    }
}

//! Account entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Account, Role};
use sqlx::FromRow;
use uuid::Uuid;

/// Columns selected for every account query.
pub const ACCOUNT_COLUMNS: &str = "id, email, display_name, role, is_active, is_approved, \
     otp_code, otp_expires_at, otp_failed_attempts, last_login_at, created_at, updated_at";

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct AccountEntity {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
    pub is_approved: bool,
    pub otp_code: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub otp_failed_attempts: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountEntity> for Account {
    fn from(entity: AccountEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            display_name: entity.display_name,
            role: entity.role.parse().unwrap_or(Role::Resource), // CHECK constraint keeps this valid
            is_active: entity.is_active,
            is_approved: entity.is_approved,
            otp_code: entity.otp_code,
            otp_expires_at: entity.otp_expires_at,
            otp_failed_attempts: entity.otp_failed_attempts,
            last_login_at: entity.last_login_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(role: &str) -> AccountEntity {
        AccountEntity {
            id: Uuid::new_v4(),
            email: "jane@acme.com".to_string(),
            display_name: "Jane".to_string(),
            role: role.to_string(),
            is_active: true,
            is_approved: false,
            otp_code: Some("123456".to_string()),
            otp_expires_at: Some(Utc::now()),
            otp_failed_attempts: 2,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_entity_to_account() {
        let account: Account = entity("pmo").into();
        assert_eq!(account.role, Role::Pmo);
        assert_eq!(account.otp_code.as_deref(), Some("123456"));
        assert_eq!(account.otp_failed_attempts, 2);
        assert!(!account.is_approved);
    }

    #[test]
    fn test_unknown_role_falls_back_to_resource() {
        let account: Account = entity("superuser").into();
        assert_eq!(account.role, Role::Resource);
    }
}

//! Account domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Access level of an account.
///
/// Capabilities nest: admins can do everything PMO can, PMO can do
/// everything evaluators can.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Pmo,
    Evaluator,
    #[default]
    Resource,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Pmo => "pmo",
            Role::Evaluator => "evaluator",
            Role::Resource => "resource",
        }
    }

    /// Human-readable role name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Pmo => "PMO Team",
            Role::Evaluator => "Evaluator",
            Role::Resource => "Resource",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "pmo" => Ok(Role::Pmo),
            "evaluator" => Ok(Role::Evaluator),
            "resource" => Ok(Role::Resource),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A portal account.
///
/// `otp_code` and `otp_expires_at` are either both set (a code is
/// outstanding) or both absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub is_active: bool,
    pub is_approved: bool,
    #[serde(skip_serializing)] // Never expose the outstanding code
    pub otp_code: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub otp_failed_attempts: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// PMO privileges: demand management and resource uploads.
    pub fn is_pmo(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Pmo)
    }

    /// True iff this is the designated super-admin address.
    pub fn is_super_admin(&self, super_admin_email: &str) -> bool {
        !super_admin_email.is_empty() && self.email.eq_ignore_ascii_case(super_admin_email.trim())
    }

    /// True if a code is stored, regardless of whether it has expired.
    pub fn has_outstanding_otp(&self) -> bool {
        self.otp_code.is_some() && self.otp_expires_at.is_some()
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub is_approved: bool,
}

impl NewAccount {
    /// A self-registered account: resource role, awaiting approval.
    pub fn self_registered(email: &str, display_name: &str) -> Self {
        Self {
            email: email.to_string(),
            display_name: display_name.to_string(),
            role: Role::Resource,
            is_approved: false,
        }
    }

    /// An account created by an admin: approved immediately.
    pub fn admin_created(email: &str, display_name: &str, role: Role) -> Self {
        Self {
            email: email.to_string(),
            display_name: display_name.to_string(),
            role,
            is_approved: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(email: &str, role: Role) -> Account {
        Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            display_name: "Test".to_string(),
            role,
            is_active: true,
            is_approved: true,
            otp_code: None,
            otp_expires_at: None,
            otp_failed_attempts: 0,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_round_trip_strings() {
        for role in [Role::Admin, Role::Pmo, Role::Evaluator, Role::Resource] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
        assert_eq!(Role::from_str(" PMO ").unwrap(), Role::Pmo);
        assert!(Role::from_str("owner").is_err());
    }

    #[test]
    fn test_role_capabilities() {
        assert!(account("a@x.com", Role::Admin).is_pmo());
        assert!(account("a@x.com", Role::Pmo).is_pmo());
        assert!(!account("a@x.com", Role::Evaluator).is_pmo());
        assert!(!account("a@x.com", Role::Pmo).is_admin());
    }

    #[test]
    fn test_is_super_admin() {
        let acc = account("boss@acme.com", Role::Admin);
        assert!(acc.is_super_admin("boss@acme.com"));
        assert!(acc.is_super_admin("BOSS@acme.com"));
        assert!(!acc.is_super_admin("other@acme.com"));
        assert!(!acc.is_super_admin(""));
    }

    #[test]
    fn test_otp_fields_not_serialized() {
        let mut acc = account("a@acme.com", Role::Resource);
        acc.otp_code = Some("123456".to_string());
        acc.otp_expires_at = Some(Utc::now());

        let json = serde_json::to_string(&acc).unwrap();
        assert!(!json.contains("123456"));
        assert!(!json.contains("otpCode"));
        assert!(json.contains("\"role\":\"resource\""));
    }

    #[test]
    fn test_new_account_constructors() {
        let reg = NewAccount::self_registered("a@acme.com", "A");
        assert!(!reg.is_approved);
        assert_eq!(reg.role, Role::Resource);

        let created = NewAccount::admin_created("b@acme.com", "B", Role::Pmo);
        assert!(created.is_approved);
        assert_eq!(created.role, Role::Pmo);
    }
}

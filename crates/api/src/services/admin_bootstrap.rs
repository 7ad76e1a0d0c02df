//! Super-admin bootstrap on startup.
//!
//! Ensures the configured super-admin account exists as an active, approved
//! admin. Idempotent: later boots re-assert the same state.

use domain::errors::AdminError;
use domain::models::Account;
use domain::services::AccountAdmin;
use tracing::{info, warn};

use crate::config::AuthConfig;

/// Provision the super-admin if one is configured.
pub async fn bootstrap_super_admin(
    admin: &AccountAdmin,
    config: &AuthConfig,
) -> Result<Option<Account>, AdminError> {
    if config.super_admin_email.trim().is_empty() {
        warn!("SH__AUTH__SUPER_ADMIN_EMAIL is not set - skipping super admin bootstrap");
        return Ok(None);
    }

    let account = admin.ensure_super_admin(&config.super_admin_name).await?;
    info!(
        email = %account.email,
        account_id = %account.id,
        "Super admin account ready"
    );
    Ok(Some(account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::Role;
    use domain::services::{AdminPolicy, InMemoryAccountStore};
    use std::sync::Arc;

    fn auth_config(super_admin_email: &str) -> AuthConfig {
        AuthConfig {
            allowed_email_domains: vec!["acme.com".to_string()],
            super_admin_email: super_admin_email.to_string(),
            super_admin_name: "Root".to_string(),
            otp_ttl_secs: 600,
            otp_max_attempts: 5,
            dev_mode: false,
            session_secret: String::new(),
            session_expiry_secs: 3600,
        }
    }

    fn admin(config: &AuthConfig) -> AccountAdmin {
        AccountAdmin::new(
            Arc::new(InMemoryAccountStore::new()),
            AdminPolicy {
                allowed_domains: config.allowed_email_domains.clone(),
                super_admin_email: config.super_admin_email.clone(),
            },
        )
    }

    #[tokio::test]
    async fn test_bootstrap_creates_super_admin() {
        let config = auth_config("Root@Acme.com");
        let account = bootstrap_super_admin(&admin(&config), &config)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.email, "root@acme.com");
        assert_eq!(account.role, Role::Admin);
        assert!(account.is_approved);
    }

    #[tokio::test]
    async fn test_bootstrap_skipped_without_email() {
        let config = auth_config("");
        assert!(bootstrap_super_admin(&admin(&config), &config)
            .await
            .unwrap()
            .is_none());
    }
}

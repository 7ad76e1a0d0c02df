//! Account registration and administration.

use std::sync::Arc;

use shared::validation::{has_allowed_domain, normalize_email};
use uuid::Uuid;

use crate::errors::AdminError;
use crate::models::{Account, NewAccount, Role};
use crate::services::store::AccountStore;

/// Who may register and which account is protected.
#[derive(Debug, Clone)]
pub struct AdminPolicy {
    pub allowed_domains: Vec<String>,
    pub super_admin_email: String,
}

/// Registration, approval and role management.
#[derive(Clone)]
pub struct AccountAdmin {
    store: Arc<dyn AccountStore>,
    policy: AdminPolicy,
}

impl AccountAdmin {
    pub fn new(store: Arc<dyn AccountStore>, policy: AdminPolicy) -> Self {
        Self { store, policy }
    }

    pub fn is_super_admin(&self, account: &Account) -> bool {
        account.is_super_admin(&self.policy.super_admin_email)
    }

    /// Self-registration. The new account waits for admin approval.
    pub async fn register(&self, email: &str, display_name: &str) -> Result<Account, AdminError> {
        let email = self.admissible_email(email)?;
        let account = self
            .store
            .create(NewAccount::self_registered(&email, display_name.trim()))
            .await?;

        tracing::info!(account_id = %account.id, "Account registered, awaiting approval");
        Ok(account)
    }

    /// Admin-created accounts are approved immediately.
    pub async fn create_account(
        &self,
        email: &str,
        display_name: &str,
        role: Role,
    ) -> Result<Account, AdminError> {
        let email = self.admissible_email(email)?;
        let account = self
            .store
            .create(NewAccount::admin_created(&email, display_name.trim(), role))
            .await?;

        tracing::info!(account_id = %account.id, role = %role, "Account created by admin");
        Ok(account)
    }

    pub async fn list_pending(&self) -> Result<Vec<Account>, AdminError> {
        Ok(self.store.list_pending().await?)
    }

    pub async fn approve(&self, id: Uuid) -> Result<Account, AdminError> {
        let account = self.store.set_approved(id, true).await?;
        tracing::info!(account_id = %id, "Account approved");
        Ok(account)
    }

    pub async fn activate(&self, id: Uuid) -> Result<Account, AdminError> {
        let account = self.store.set_active(id, true).await?;
        tracing::info!(account_id = %id, "Account activated");
        Ok(account)
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<Account, AdminError> {
        self.guard_super_admin(id).await?;
        let account = self.store.set_active(id, false).await?;
        tracing::info!(account_id = %id, "Account deactivated");
        Ok(account)
    }

    pub async fn change_role(&self, id: Uuid, role: Role) -> Result<Account, AdminError> {
        let current = self.load(id).await?;
        if role != Role::Admin && self.is_super_admin(&current) {
            return Err(AdminError::SuperAdminProtected);
        }
        let account = self.store.set_role(id, role).await?;
        tracing::info!(account_id = %id, role = %role, "Account role changed");
        Ok(account)
    }

    /// Provisions the configured super-admin as an active, approved admin.
    pub async fn ensure_super_admin(&self, display_name: &str) -> Result<Account, AdminError> {
        let email = normalize_email(&self.policy.super_admin_email);
        let account = self.store.ensure_super_admin(&email, display_name).await?;
        tracing::info!(account_id = %account.id, "Super admin ensured");
        Ok(account)
    }

    fn admissible_email(&self, email: &str) -> Result<String, AdminError> {
        let email = normalize_email(email);
        if !has_allowed_domain(&email, &self.policy.allowed_domains) {
            return Err(AdminError::InvalidDomain);
        }
        Ok(email)
    }

    async fn load(&self, id: Uuid) -> Result<Account, AdminError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AdminError::NotFound)
    }

    async fn guard_super_admin(&self, id: Uuid) -> Result<(), AdminError> {
        if self.is_super_admin(&self.load(id).await?) {
            return Err(AdminError::SuperAdminProtected);
        }
        Ok(())
    }
}

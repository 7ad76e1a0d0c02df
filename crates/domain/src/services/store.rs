//! Storage abstractions consumed by the domain services.
//!
//! The persistence crate implements these over PostgreSQL; `memory` holds
//! in-process implementations for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{Account, Demand, NewAccount, NewDemand, NewResource, Resource, Role};

/// Account persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Looks up by normalized (lowercase) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Fails with `Conflict` when the email is taken.
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Replaces any outstanding code and resets the failed-attempt counter.
    async fn store_otp(
        &self,
        id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Clears the outstanding code, its expiry and the attempt counter, but
    /// only while `code` is still the outstanding one. Returns whether it was
    /// cleared.
    async fn discard_otp(&self, id: Uuid, code: &str) -> Result<bool, StoreError>;

    /// Atomically redeems `code`: clears it like [`discard_otp`] only if it is
    /// still outstanding and unexpired at `now`. Of several concurrent callers
    /// presenting the same code, at most one gets `true`.
    ///
    /// [`discard_otp`]: AccountStore::discard_otp
    async fn consume_otp(
        &self,
        id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Increments the failed-attempt counter, returning the new value.
    async fn record_failed_attempt(&self, id: Uuid) -> Result<i32, StoreError>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn set_approved(&self, id: Uuid, approved: bool) -> Result<Account, StoreError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Account, StoreError>;

    async fn set_role(&self, id: Uuid, role: Role) -> Result<Account, StoreError>;

    /// Accounts awaiting approval, oldest first.
    async fn list_pending(&self) -> Result<Vec<Account>, StoreError>;

    /// Creates or promotes the super-admin: admin role, active, approved.
    async fn ensure_super_admin(
        &self,
        email: &str,
        display_name: &str,
    ) -> Result<Account, StoreError>;
}

/// Demand persistence.
#[async_trait]
pub trait DemandStore: Send + Sync {
    async fn create(&self, demand: NewDemand) -> Result<Demand, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Demand>, StoreError>;
}

/// Resource persistence.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Inserts the whole batch atomically: either every row lands or none.
    async fn insert_batch(&self, batch: Vec<NewResource>) -> Result<Vec<Resource>, StoreError>;

    /// Resources of a demand, newest first.
    async fn list_for_demand(&self, demand_id: Uuid) -> Result<Vec<Resource>, StoreError>;
}

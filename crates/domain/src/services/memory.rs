//! In-memory store implementations.
//!
//! Backed by `RwLock`ed maps. Suitable for tests and for running the API
//! without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{Account, Demand, NewAccount, NewDemand, NewResource, Resource, Role};
use crate::services::store::{AccountStore, DemandStore, ResourceStore};

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

/// Accounts keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a fully formed account, replacing any with the same id.
    pub fn insert(&self, account: Account) -> Result<(), StoreError> {
        self.accounts
            .write()
            .map_err(poisoned)?
            .insert(account.id, account);
        Ok(())
    }

    fn update<F>(&self, id: Uuid, f: F) -> Result<Account, StoreError>
    where
        F: FnOnce(&mut Account),
    {
        let mut accounts = self.accounts.write().map_err(poisoned)?;
        let account = accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        f(account);
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    /// Check and clear happen under one write lock.
    fn clear_otp_if<P>(&self, id: Uuid, predicate: P) -> Result<bool, StoreError>
    where
        P: FnOnce(&Account) -> bool,
    {
        let mut accounts = self.accounts.write().map_err(poisoned)?;
        let account = accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        if !predicate(account) {
            return Ok(false);
        }
        account.otp_code = None;
        account.otp_expires_at = None;
        account.otp_failed_attempts = 0;
        account.updated_at = Utc::now();
        Ok(true)
    }
}

fn build_account(new: NewAccount, now: DateTime<Utc>) -> Account {
    Account {
        id: Uuid::new_v4(),
        email: new.email.to_lowercase(),
        display_name: new.display_name,
        role: new.role,
        is_active: true,
        is_approved: new.is_approved,
        otp_code: None,
        otp_expires_at: None,
        otp_failed_attempts: 0,
        last_login_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().map_err(poisoned)?;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().map_err(poisoned)?;
        let email = account.email.to_lowercase();
        if accounts.values().any(|a| a.email == email) {
            return Err(StoreError::Conflict(format!("email {} already exists", email)));
        }
        let account = build_account(account, Utc::now());
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn store_otp(
        &self,
        id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.update(id, |a| {
            a.otp_code = Some(code.to_string());
            a.otp_expires_at = Some(expires_at);
            a.otp_failed_attempts = 0;
        })
        .map(|_| ())
    }

    async fn discard_otp(&self, id: Uuid, code: &str) -> Result<bool, StoreError> {
        self.clear_otp_if(id, |a| a.otp_code.as_deref() == Some(code))
    }

    async fn consume_otp(
        &self,
        id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.clear_otp_if(id, |a| {
            a.otp_code.as_deref() == Some(code)
                && a.otp_expires_at.is_some_and(|expires_at| expires_at >= now)
        })
    }

    async fn record_failed_attempt(&self, id: Uuid) -> Result<i32, StoreError> {
        self.update(id, |a| a.otp_failed_attempts += 1)
            .map(|a| a.otp_failed_attempts)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.update(id, |a| a.last_login_at = Some(at)).map(|_| ())
    }

    async fn set_approved(&self, id: Uuid, approved: bool) -> Result<Account, StoreError> {
        self.update(id, |a| a.is_approved = approved)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Account, StoreError> {
        self.update(id, |a| a.is_active = active)
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<Account, StoreError> {
        self.update(id, |a| a.role = role)
    }

    async fn list_pending(&self) -> Result<Vec<Account>, StoreError> {
        let accounts = self.accounts.read().map_err(poisoned)?;
        let mut pending: Vec<Account> = accounts
            .values()
            .filter(|a| !a.is_approved)
            .cloned()
            .collect();
        pending.sort_by_key(|a| a.created_at);
        Ok(pending)
    }

    async fn ensure_super_admin(
        &self,
        email: &str,
        display_name: &str,
    ) -> Result<Account, StoreError> {
        let email = email.to_lowercase();
        let mut accounts = self.accounts.write().map_err(poisoned)?;
        let now = Utc::now();

        if let Some(account) = accounts.values_mut().find(|a| a.email == email) {
            account.role = Role::Admin;
            account.is_active = true;
            account.is_approved = true;
            account.updated_at = now;
            return Ok(account.clone());
        }

        let account = build_account(
            NewAccount::admin_created(&email, display_name, Role::Admin),
            now,
        );
        accounts.insert(account.id, account.clone());
        Ok(account)
    }
}

/// Demands keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryDemandStore {
    demands: RwLock<HashMap<Uuid, Demand>>,
}

impl InMemoryDemandStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DemandStore for InMemoryDemandStore {
    async fn create(&self, demand: NewDemand) -> Result<Demand, StoreError> {
        let demand = Demand {
            id: Uuid::new_v4(),
            rrd: demand.rrd,
            project_name: demand.project_name,
            created_by: demand.created_by,
            created_at: Utc::now(),
        };
        self.demands
            .write()
            .map_err(poisoned)?
            .insert(demand.id, demand.clone());
        Ok(demand)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Demand>, StoreError> {
        Ok(self.demands.read().map_err(poisoned)?.get(&id).cloned())
    }
}

/// Resources in insertion order.
///
/// `fail_commits` makes every `insert_batch` fail without storing anything.
#[derive(Debug, Default)]
pub struct InMemoryResourceStore {
    resources: RwLock<Vec<Resource>>,
    fail_commits: AtomicBool,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose commits always fail.
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_fail_commits(true);
        store
    }

    pub fn set_fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.resources.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn insert_batch(&self, batch: Vec<NewResource>) -> Result<Vec<Resource>, StoreError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("simulated commit failure".to_string()));
        }

        let now = Utc::now();
        let inserted: Vec<Resource> = batch
            .into_iter()
            .map(|r| Resource {
                id: Uuid::new_v4(),
                demand_id: r.demand_id,
                personnel_no: r.personnel_no,
                name: r.name,
                primary_skill: r.primary_skill,
                management_level: r.management_level,
                home_location: r.home_location,
                lock_status: r.lock_status,
                availability_status: r.availability_status,
                email: r.email,
                contact_details: r.contact_details,
                joining_date: r.joining_date,
                evaluation_status: "pending".to_string(),
                uploaded_by: r.uploaded_by,
                uploaded_at: now,
            })
            .collect();

        self.resources
            .write()
            .map_err(poisoned)?
            .extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn list_for_demand(&self, demand_id: Uuid) -> Result<Vec<Resource>, StoreError> {
        let resources = self.resources.read().map_err(poisoned)?;
        Ok(resources
            .iter()
            .rev()
            .filter(|r| r.demand_id == demand_id)
            .cloned()
            .collect())
    }
}

//! Account repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::errors::StoreError;
use domain::models::{Account, NewAccount, Role};
use domain::services::AccountStore;
use sqlx::PgPool;
use uuid::Uuid;

use super::store_error;
use crate::entities::{AccountEntity, ACCOUNT_COLUMNS};
use crate::metrics::QueryTimer;

/// Repository for account-related database operations.
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Creates a new AccountRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one(&self, query_name: &str, sql: &str, id: Uuid) -> Result<Account, StoreError> {
        let timer = QueryTimer::new(query_name);
        let result = sqlx::query_as::<_, AccountEntity>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
            .map_err(store_error)?
            .map(Account::from)
            .ok_or(StoreError::NotFound)
    }

    async fn execute(
        &self,
        query_name: &str,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<(), StoreError> {
        let timer = QueryTimer::new(query_name);
        let result = query.execute(&self.pool).await;
        timer.record();
        if result.map_err(store_error)?.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Runs a guarded update; `false` when the guard matched no row.
    async fn execute_guarded(
        &self,
        query_name: &str,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<bool, StoreError> {
        let timer = QueryTimer::new(query_name);
        let result = query.execute(&self.pool).await;
        timer.record();
        Ok(result.map_err(store_error)?.rows_affected() == 1)
    }
}

#[async_trait]
impl AccountStore for AccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let timer = QueryTimer::new("find_account_by_email");
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = $1");
        let result = sqlx::query_as::<_, AccountEntity>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(Account::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
        match self.fetch_one("find_account_by_id", &sql, id).await {
            Ok(account) => Ok(Some(account)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let timer = QueryTimer::new("create_account");
        let sql = format!(
            r#"
            INSERT INTO users (email, display_name, role, is_active, is_approved)
            VALUES (LOWER($1), $2, $3, true, $4)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let result = sqlx::query_as::<_, AccountEntity>(&sql)
            .bind(&account.email)
            .bind(&account.display_name)
            .bind(account.role.as_str())
            .bind(account.is_approved)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result.map(Account::from).map_err(store_error)
    }

    async fn store_otp(
        &self,
        id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            UPDATE users
            SET otp_code = $2, otp_expires_at = $3, otp_failed_attempts = 0, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(expires_at);
        self.execute("store_account_otp", query).await
    }

    async fn discard_otp(&self, id: Uuid, code: &str) -> Result<bool, StoreError> {
        let query = sqlx::query(
            r#"
            UPDATE users
            SET otp_code = NULL, otp_expires_at = NULL, otp_failed_attempts = 0, updated_at = NOW()
            WHERE id = $1 AND otp_code = $2
            "#,
        )
        .bind(id)
        .bind(code);
        self.execute_guarded("discard_account_otp", query).await
    }

    async fn consume_otp(
        &self,
        id: Uuid,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        // Single-statement compare-and-clear; the row lock serializes racers.
        let query = sqlx::query(
            r#"
            UPDATE users
            SET otp_code = NULL, otp_expires_at = NULL, otp_failed_attempts = 0, updated_at = NOW()
            WHERE id = $1 AND otp_code = $2 AND otp_expires_at >= $3
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(now);
        self.execute_guarded("consume_account_otp", query).await
    }

    async fn record_failed_attempt(&self, id: Uuid) -> Result<i32, StoreError> {
        let timer = QueryTimer::new("record_otp_failed_attempt");
        let result = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE users
            SET otp_failed_attempts = otp_failed_attempts + 1, updated_at = NOW()
            WHERE id = $1
            RETURNING otp_failed_attempts
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)?.ok_or(StoreError::NotFound)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        let query = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(at);
        self.execute("update_account_last_login", query).await
    }

    async fn set_approved(&self, id: Uuid, approved: bool) -> Result<Account, StoreError> {
        let timer = QueryTimer::new("set_account_approved");
        let sql = format!(
            "UPDATE users SET is_approved = $2, updated_at = NOW() WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        );
        let result = sqlx::query_as::<_, AccountEntity>(&sql)
            .bind(id)
            .bind(approved)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
            .map_err(store_error)?
            .map(Account::from)
            .ok_or(StoreError::NotFound)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Account, StoreError> {
        let timer = QueryTimer::new("set_account_active");
        let sql = format!(
            "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        );
        let result = sqlx::query_as::<_, AccountEntity>(&sql)
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
            .map_err(store_error)?
            .map(Account::from)
            .ok_or(StoreError::NotFound)
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<Account, StoreError> {
        let timer = QueryTimer::new("set_account_role");
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        );
        let result = sqlx::query_as::<_, AccountEntity>(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
            .map_err(store_error)?
            .map(Account::from)
            .ok_or(StoreError::NotFound)
    }

    async fn list_pending(&self) -> Result<Vec<Account>, StoreError> {
        let timer = QueryTimer::new("list_pending_accounts");
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE is_approved = false ORDER BY created_at ASC"
        );
        let result = sqlx::query_as::<_, AccountEntity>(&sql)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(Account::from)
            .collect())
    }

    async fn ensure_super_admin(
        &self,
        email: &str,
        display_name: &str,
    ) -> Result<Account, StoreError> {
        let timer = QueryTimer::new("ensure_super_admin");
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE email = LOWER($1) FOR UPDATE")
                .bind(email)
                .fetch_optional(&mut *tx)
                .await
                .map_err(store_error)?;

        let entity = match existing {
            Some(id) => {
                let sql = format!(
                    r#"
                    UPDATE users
                    SET role = 'admin', is_active = true, is_approved = true, updated_at = NOW()
                    WHERE id = $1
                    RETURNING {ACCOUNT_COLUMNS}
                    "#
                );
                sqlx::query_as::<_, AccountEntity>(&sql)
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(store_error)?
            }
            None => {
                let sql = format!(
                    r#"
                    INSERT INTO users (email, display_name, role, is_active, is_approved)
                    VALUES (LOWER($1), $2, 'admin', true, true)
                    RETURNING {ACCOUNT_COLUMNS}
                    "#
                );
                sqlx::query_as::<_, AccountEntity>(&sql)
                    .bind(email)
                    .bind(display_name)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(store_error)?
            }
        };

        tx.commit().await.map_err(store_error)?;
        timer.record();
        Ok(entity.into())
    }
}

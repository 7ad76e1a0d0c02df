//! Resource repository for database operations.

use async_trait::async_trait;
use domain::errors::StoreError;
use domain::models::{NewResource, Resource};
use domain::services::ResourceStore;
use sqlx::PgPool;
use uuid::Uuid;

use super::store_error;
use crate::entities::{ResourceEntity, RESOURCE_COLUMNS};
use crate::metrics::QueryTimer;

/// Repository for resource-related database operations.
#[derive(Clone)]
pub struct ResourceRepository {
    pool: PgPool,
}

impl ResourceRepository {
    /// Creates a new ResourceRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceStore for ResourceRepository {
    /// Inserts every row in one transaction. Any failure drops the
    /// transaction uncommitted, rolling back the rows inserted so far.
    async fn insert_batch(&self, batch: Vec<NewResource>) -> Result<Vec<Resource>, StoreError> {
        let timer = QueryTimer::new("insert_resource_batch");
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let sql = format!(
            r#"
            INSERT INTO resources (
                demand_id, personnel_no, name, primary_skill, management_level,
                home_location, lock_status, availability_status, email,
                contact_details, joining_date, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {RESOURCE_COLUMNS}
            "#
        );

        let mut inserted = Vec::with_capacity(batch.len());
        for resource in batch {
            let entity = sqlx::query_as::<_, ResourceEntity>(&sql)
                .bind(resource.demand_id)
                .bind(&resource.personnel_no)
                .bind(&resource.name)
                .bind(&resource.primary_skill)
                .bind(&resource.management_level)
                .bind(&resource.home_location)
                .bind(&resource.lock_status)
                .bind(&resource.availability_status)
                .bind(&resource.email)
                .bind(&resource.contact_details)
                .bind(&resource.joining_date)
                .bind(resource.uploaded_by)
                .fetch_one(&mut *tx)
                .await
                .map_err(store_error)?;
            inserted.push(Resource::from(entity));
        }

        tx.commit().await.map_err(store_error)?;
        timer.record();
        Ok(inserted)
    }

    async fn list_for_demand(&self, demand_id: Uuid) -> Result<Vec<Resource>, StoreError> {
        let timer = QueryTimer::new("list_resources_for_demand");
        let sql = format!(
            "SELECT {RESOURCE_COLUMNS} FROM resources WHERE demand_id = $1 ORDER BY uploaded_at DESC, id DESC"
        );
        let result = sqlx::query_as::<_, ResourceEntity>(&sql)
            .bind(demand_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(Resource::from)
            .collect())
    }
}

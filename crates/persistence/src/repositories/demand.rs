//! Demand repository for database operations.

use async_trait::async_trait;
use domain::errors::StoreError;
use domain::models::{Demand, NewDemand};
use domain::services::DemandStore;
use sqlx::PgPool;
use uuid::Uuid;

use super::store_error;
use crate::entities::DemandEntity;
use crate::metrics::QueryTimer;

/// Repository for demand-related database operations.
#[derive(Clone)]
pub struct DemandRepository {
    pool: PgPool,
}

impl DemandRepository {
    /// Creates a new DemandRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DemandStore for DemandRepository {
    async fn create(&self, demand: NewDemand) -> Result<Demand, StoreError> {
        let timer = QueryTimer::new("create_demand");
        let result = sqlx::query_as::<_, DemandEntity>(
            r#"
            INSERT INTO demands (rrd, project_name, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, rrd, project_name, created_by, created_at
            "#,
        )
        .bind(demand.rrd.trim())
        .bind(demand.project_name.trim())
        .bind(demand.created_by)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map(Demand::from).map_err(store_error)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Demand>, StoreError> {
        let timer = QueryTimer::new("find_demand_by_id");
        let result = sqlx::query_as::<_, DemandEntity>(
            r#"
            SELECT id, rrd, project_name, created_by, created_at
            FROM demands
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result.map_err(store_error)?.map(Demand::from))
    }
}

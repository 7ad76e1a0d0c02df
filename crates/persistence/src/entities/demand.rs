//! Demand entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the demands table.
#[derive(Debug, Clone, FromRow)]
pub struct DemandEntity {
    pub id: Uuid,
    pub rrd: String,
    pub project_name: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<DemandEntity> for domain::models::Demand {
    fn from(entity: DemandEntity) -> Self {
        Self {
            id: entity.id,
            rrd: entity.rrd,
            project_name: entity.project_name,
            created_by: entity.created_by,
            created_at: entity.created_at,
        }
    }
}

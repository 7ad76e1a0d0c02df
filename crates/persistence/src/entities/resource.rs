//! Resource entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const RESOURCE_COLUMNS: &str = "id, demand_id, personnel_no, name, primary_skill, \
     management_level, home_location, lock_status, availability_status, email, \
     contact_details, joining_date, evaluation_status, uploaded_by, uploaded_at";

/// Database row mapping for the resources table.
#[derive(Debug, Clone, FromRow)]
pub struct ResourceEntity {
    pub id: Uuid,
    pub demand_id: Uuid,
    pub personnel_no: String,
    pub name: String,
    pub primary_skill: String,
    pub management_level: String,
    pub home_location: String,
    pub lock_status: String,
    pub availability_status: String,
    pub email: String,
    pub contact_details: String,
    pub joining_date: String,
    pub evaluation_status: String,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ResourceEntity> for domain::models::Resource {
    fn from(entity: ResourceEntity) -> Self {
        Self {
            id: entity.id,
            demand_id: entity.demand_id,
            personnel_no: entity.personnel_no,
            name: entity.name,
            primary_skill: entity.primary_skill,
            management_level: entity.management_level,
            home_location: entity.home_location,
            lock_status: entity.lock_status,
            availability_status: entity.availability_status,
            email: entity.email,
            contact_details: entity.contact_details,
            joining_date: entity.joining_date,
            evaluation_status: entity.evaluation_status,
            uploaded_by: entity.uploaded_by,
            uploaded_at: entity.uploaded_at,
        }
    }
}

//! Demand domain models.
//!
//! A demand (RRD) is the target of a resource upload batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A project resource demand posted by PMO.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    pub id: Uuid,
    pub rrd: String,
    pub project_name: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a demand.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewDemand {
    #[validate(length(min = 1, max = 255, message = "rrd must be 1-255 characters"))]
    pub rrd: String,

    #[validate(length(min = 1, max = 255, message = "projectName must be 1-255 characters"))]
    pub project_name: String,

    #[serde(skip)]
    pub created_by: Option<Uuid>,
}

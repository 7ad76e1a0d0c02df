//! Demand routes and resource workbook uploads.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{BatchResult, Demand, NewDemand, Resource};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::metrics::record_upload;
use crate::services::workbook::decode_first_sheet;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceListResponse {
    pub demand: Demand,
    pub data: Vec<Resource>,
    pub total: usize,
}

/// POST /api/v1/demands
pub async fn create_demand(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(mut request): Json<NewDemand>,
) -> Result<(StatusCode, Json<Demand>), ApiError> {
    user.require_pmo()?;
    request.rrd = request.rrd.trim().to_string();
    request.project_name = request.project_name.trim().to_string();
    request.validate()?;

    request.created_by = Some(user.account.id);
    let demand = state.demands.create(request).await?;

    tracing::info!(demand_id = %demand.id, rrd = %demand.rrd, "Demand created");
    Ok((StatusCode::CREATED, Json(demand)))
}

/// Resources uploaded against a demand, newest first.
///
/// GET /api/v1/demands/:id/resources
pub async fn list_resources(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResourceListResponse>, ApiError> {
    user.require_pmo()?;
    let demand = load_demand(&state, id).await?;

    let data = state.resources.list_for_demand(id).await?;
    Ok(Json(ResourceListResponse {
        demand,
        total: data.len(),
        data,
    }))
}

/// Ingest the first worksheet of a workbook sent as the raw request body.
///
/// POST /api/v1/demands/:id/resources/upload
///
/// Responds with the batch result: 201 once committed, 422 when the sheet
/// was rejected before any row was read, 500 when the commit rolled back.
pub async fn upload_resources(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<(StatusCode, Json<BatchResult>), ApiError> {
    user.require_pmo()?;
    load_demand(&state, id).await?;

    if body.is_empty() {
        return Err(ApiError::Validation("Upload body is empty".into()));
    }

    let sheet = decode_first_sheet(&body).map_err(|e| {
        tracing::warn!(demand_id = %id, error = %e, "Workbook decode failed");
        ApiError::Validation(e.to_string())
    })?;

    let result = state.ingestion.ingest(&sheet, id, Some(user.account.id)).await;
    record_upload(
        result.stage.as_str(),
        result.accepted_count,
        result.error_count,
    );

    Ok((upload_status(&result), Json(result)))
}

/// 201 on success; a failure after rows were processed is a server fault,
/// one before is the caller's.
fn upload_status(result: &BatchResult) -> StatusCode {
    if result.is_success() {
        StatusCode::CREATED
    } else if result.stage.is_terminal() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

async fn load_demand(state: &AppState, id: Uuid) -> Result<Demand, ApiError> {
    state
        .demands
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Demand not found".into()))
}

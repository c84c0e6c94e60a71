use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use vela_revenue::RunError;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RunPricingRequest {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub location_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RunPricingResponse {
    pub ok: bool,
    pub priced: usize,
    pub run_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PricingRunResponse {
    pub id: Uuid,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/v1/room-types/{room_type_id}/pricing-runs",
        post(run_pricing).get(list_runs),
    )
}

/// POST /v1/room-types/:room_type_id/pricing-runs
/// Recompute suggested prices for the date range
pub async fn run_pricing(
    State(state): State<Arc<AppState>>,
    Path(room_type_id): Path<Uuid>,
    Json(req): Json<RunPricingRequest>,
) -> Result<Json<RunPricingResponse>, AppError> {
    if req.from > req.to {
        return Err(AppError::ValidationError(
            "'from' must not be after 'to'".to_string(),
        ));
    }

    let outcome = state
        .orchestrator
        .run(room_type_id, req.from, req.to, req.location_id)
        .await
        .map_err(map_run_error)?;

    Ok(Json(RunPricingResponse {
        ok: true,
        priced: outcome.priced,
        run_id: outcome.run_id,
    }))
}

/// GET /v1/room-types/:room_type_id/pricing-runs
/// Recent run records, newest first
pub async fn list_runs(
    State(state): State<Arc<AppState>>,
    Path(room_type_id): Path<Uuid>,
) -> Result<Json<Vec<PricingRunResponse>>, AppError> {
    let runs = state
        .runs
        .list_recent(room_type_id, 20)
        .await
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!(e)))?;

    Ok(Json(
        runs.into_iter()
            .map(|run| PricingRunResponse {
                id: run.id,
                from_date: run.from_date,
                to_date: run.to_date,
                started_at: run.started_at,
                finished_at: run.finished_at,
                notes: run.notes,
            })
            .collect(),
    ))
}

fn map_run_error(err: RunError) -> AppError {
    match err {
        RunError::RoomTypeNotFound(_) => AppError::NotFoundError(err.to_string()),
        RunError::InvalidPricingBounds { .. } => AppError::ValidationError(err.to_string()),
        RunError::LoadFailed { .. } | RunError::WriteFailed { .. } => {
            AppError::Anyhow(err.into())
        }
    }
}

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use vela_pricing::PriceBreakdown;
use vela_revenue::CalendarError;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct CalendarDayResponse {
    pub date: NaiveDate,
    /// Override when present, otherwise the engine's suggestion.
    pub price: Option<f64>,
    pub has_override: bool,
    pub locked: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetOverrideRequest {
    /// None clears the override; display falls back to the suggestion.
    pub price: Option<f64>,
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Serialize)]
pub struct OverrideResponse {
    pub date: NaiveDate,
    pub suggested_price: Option<f64>,
    pub override_price: Option<f64>,
    pub locked: bool,
}

#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    pub run_id: Uuid,
    pub date: NaiveDate,
    pub breakdown: PriceBreakdown,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/room-types/{room_type_id}/calendar", get(get_calendar))
        .route(
            "/v1/room-types/{room_type_id}/calendar/{date}/override",
            put(set_override),
        )
        .route(
            "/v1/room-types/{room_type_id}/calendar/{date}/breakdown",
            get(get_breakdown),
        )
}

/// GET /v1/room-types/:room_type_id/calendar?from=..&to=..
pub async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Path(room_type_id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarDayResponse>>, AppError> {
    if query.from > query.to {
        return Err(AppError::ValidationError(
            "'from' must not be after 'to'".to_string(),
        ));
    }

    let days = state
        .calendar
        .calendar(room_type_id, query.from, query.to)
        .await
        .map_err(map_calendar_error)?;

    Ok(Json(
        days.into_iter()
            .map(|day| CalendarDayResponse {
                date: day.stay_date,
                price: day.price,
                has_override: day.has_override,
                locked: day.locked,
            })
            .collect(),
    ))
}

/// PUT /v1/room-types/:room_type_id/calendar/:date/override
/// Writes only the human-owned override/lock columns
pub async fn set_override(
    State(state): State<Arc<AppState>>,
    Path((room_type_id, date)): Path<(Uuid, NaiveDate)>,
    Json(req): Json<SetOverrideRequest>,
) -> Result<Json<OverrideResponse>, AppError> {
    let row = state
        .calendar
        .set_override(room_type_id, date, req.price, req.locked)
        .await
        .map_err(map_calendar_error)?;

    Ok(Json(OverrideResponse {
        date: row.stay_date,
        suggested_price: row.suggested_price,
        override_price: row.override_price,
        locked: row.locked,
    }))
}

/// GET /v1/room-types/:room_type_id/calendar/:date/breakdown
/// The most recent audit snapshot for the cell
pub async fn get_breakdown(
    State(state): State<Arc<AppState>>,
    Path((room_type_id, date)): Path<(Uuid, NaiveDate)>,
) -> Result<Json<BreakdownResponse>, AppError> {
    let audit = state
        .calendar
        .breakdown(room_type_id, date)
        .await
        .map_err(map_calendar_error)?;

    Ok(Json(BreakdownResponse {
        run_id: audit.run_id,
        date: audit.stay_date,
        breakdown: audit.breakdown,
        created_at: audit.created_at,
    }))
}

fn map_calendar_error(err: CalendarError) -> AppError {
    match err {
        CalendarError::NoData { .. } => AppError::NotFoundError(err.to_string()),
        CalendarError::LoadFailed { .. } | CalendarError::WriteFailed { .. } => {
            AppError::Anyhow(err.into())
        }
    }
}

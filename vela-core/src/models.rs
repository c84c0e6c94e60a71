use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vela_pricing::PriceBreakdown;

/// A sellable inventory category. Admin tooling owns the record; the
/// engine only reads it. Pricing bounds are nullable in storage so a
/// misconfigured room type is detectable at run time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomType {
    pub id: Uuid,
    pub name: String,
    pub location_id: Option<Uuid>,
    pub base_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub is_active: bool,
}

/// External per-date demand/competitor signal, produced by the signal
/// pipeline. Read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketFactor {
    pub stay_date: NaiveDate,
    /// None means the row applies globally.
    pub location_id: Option<Uuid>,
    pub demand: f64,
    pub comp_pressure_auto: f64,
    pub manual_multiplier: f64,
    pub events_weight: f64,
    pub pickup_z: f64,
    pub availability_z: f64,
    pub comp_price_z: f64,
}

/// Occupancy percentage for one stay date, computed externally over live
/// bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateOccupancy {
    pub stay_date: NaiveDate,
    pub occupancy_pct: f64,
}

/// The persisted price for one room-type/date cell. `suggested_price`
/// belongs to the engine; `override_price` and `locked` belong to humans
/// and are never written by a pricing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPrice {
    pub room_type_id: Uuid,
    pub stay_date: NaiveDate,
    pub suggested_price: Option<f64>,
    pub override_price: Option<f64>,
    pub locked: bool,
}

/// One engine-owned suggested-price write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedPrice {
    pub room_type_id: Uuid,
    pub stay_date: NaiveDate,
    pub suggested_price: f64,
}

/// One historical snapshot of every factor that produced a final price.
/// Append-only; exactly one row per date per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingAudit {
    pub id: Uuid,
    pub run_id: Uuid,
    pub room_type_id: Uuid,
    pub stay_date: NaiveDate,
    #[serde(flatten)]
    pub breakdown: PriceBreakdown,
    pub created_at: DateTime<Utc>,
}

/// One invocation of the run orchestrator. Created at run start,
/// finalized at run end; a failed run never reaches `finished_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRun {
    pub id: Uuid,
    pub room_type_id: Uuid,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

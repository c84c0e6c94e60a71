use crate::models::{
    DateOccupancy, ListingPrice, MarketFactor, PricingAudit, PricingRun, RoomType, SuggestedPrice,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use vela_pricing::{PricingRules, SeasonalitySetting};

pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Read access to room-type records.
#[async_trait]
pub trait RoomTypeRepository: Send + Sync {
    async fn get_room_type(&self, id: Uuid) -> Result<Option<RoomType>, RepoError>;
}

/// Read access to the admin-owned pricing rules document.
#[async_trait]
pub trait PricingRulesRepository: Send + Sync {
    async fn get_rules(&self, room_type_id: Uuid) -> Result<Option<PricingRules>, RepoError>;
}

/// Read access to active season definitions. Implementations return only
/// active rows, ordered by `display_order`: global rows when
/// `location_id` is None, global-or-matching rows otherwise.
#[async_trait]
pub trait SeasonalityRepository: Send + Sync {
    async fn list_active(
        &self,
        location_id: Option<Uuid>,
    ) -> Result<Vec<SeasonalitySetting>, RepoError>;
}

/// Read access to the externally produced market signal rows.
#[async_trait]
pub trait MarketFactorRepository: Send + Sync {
    async fn list_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        location_id: Option<Uuid>,
    ) -> Result<Vec<MarketFactor>, RepoError>;
}

/// The external occupancy signal, keyed by stay date.
#[async_trait]
pub trait OccupancyProvider: Send + Sync {
    async fn occupancy_by_date(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DateOccupancy>, RepoError>;
}

/// Listing-price cells. `upsert_suggested` must touch only the
/// engine-owned `suggested_price` column; `set_override` must touch only
/// the human-owned `override_price`/`locked` columns.
#[async_trait]
pub trait ListingPriceRepository: Send + Sync {
    async fn upsert_suggested(&self, prices: &[SuggestedPrice]) -> Result<(), RepoError>;

    async fn set_override(
        &self,
        room_type_id: Uuid,
        stay_date: NaiveDate,
        price: Option<f64>,
        locked: bool,
    ) -> Result<ListingPrice, RepoError>;

    async fn list_range(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ListingPrice>, RepoError>;
}

/// Append-only audit trail of pricing decisions.
#[async_trait]
pub trait PricingAuditRepository: Send + Sync {
    async fn insert_batch(&self, rows: &[PricingAudit]) -> Result<(), RepoError>;

    async fn latest_for(
        &self,
        room_type_id: Uuid,
        stay_date: NaiveDate,
    ) -> Result<Option<PricingAudit>, RepoError>;
}

/// Run bookkeeping records.
#[async_trait]
pub trait PricingRunRepository: Send + Sync {
    async fn create_run(&self, run: &PricingRun) -> Result<(), RepoError>;

    async fn finish_run(
        &self,
        id: Uuid,
        finished_at: DateTime<Utc>,
        notes: &str,
    ) -> Result<(), RepoError>;

    async fn list_recent(
        &self,
        room_type_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PricingRun>, RepoError>;
}

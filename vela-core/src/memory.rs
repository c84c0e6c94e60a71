//! In-memory repository implementations, for tests and local development
//! without a database.

use crate::models::{
    DateOccupancy, ListingPrice, MarketFactor, PricingAudit, PricingRun, RoomType, SuggestedPrice,
};
use crate::repository::{
    ListingPriceRepository, MarketFactorRepository, OccupancyProvider, PricingAuditRepository,
    PricingRulesRepository, PricingRunRepository, RepoError, RoomTypeRepository,
    SeasonalityRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;
use vela_pricing::{PricingRules, SeasonalitySetting};

#[derive(Default)]
pub struct InMemoryRoomTypes {
    rows: Mutex<HashMap<Uuid, RoomType>>,
}

impl InMemoryRoomTypes {
    pub fn insert(&self, room_type: RoomType) {
        self.rows.lock().unwrap().insert(room_type.id, room_type);
    }
}

#[async_trait]
impl RoomTypeRepository for InMemoryRoomTypes {
    async fn get_room_type(&self, id: Uuid) -> Result<Option<RoomType>, RepoError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryPricingRules {
    rows: Mutex<HashMap<Uuid, PricingRules>>,
}

impl InMemoryPricingRules {
    pub fn insert(&self, room_type_id: Uuid, rules: PricingRules) {
        self.rows.lock().unwrap().insert(room_type_id, rules);
    }
}

#[async_trait]
impl PricingRulesRepository for InMemoryPricingRules {
    async fn get_rules(&self, room_type_id: Uuid) -> Result<Option<PricingRules>, RepoError> {
        Ok(self.rows.lock().unwrap().get(&room_type_id).cloned())
    }
}

#[derive(Default)]
pub struct InMemorySeasonality {
    rows: Mutex<Vec<SeasonalitySetting>>,
}

impl InMemorySeasonality {
    pub fn insert(&self, setting: SeasonalitySetting) {
        self.rows.lock().unwrap().push(setting);
    }
}

#[async_trait]
impl SeasonalityRepository for InMemorySeasonality {
    async fn list_active(
        &self,
        location_id: Option<Uuid>,
    ) -> Result<Vec<SeasonalitySetting>, RepoError> {
        let mut rows: Vec<SeasonalitySetting> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.is_active)
            .filter(|s| match location_id {
                None => s.location_id.is_none(),
                Some(loc) => s.location_id.is_none() || s.location_id == Some(loc),
            })
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.display_order);
        Ok(rows)
    }
}

#[derive(Default)]
pub struct InMemoryMarketFactors {
    rows: Mutex<Vec<MarketFactor>>,
}

impl InMemoryMarketFactors {
    pub fn insert(&self, factor: MarketFactor) {
        self.rows.lock().unwrap().push(factor);
    }
}

#[async_trait]
impl MarketFactorRepository for InMemoryMarketFactors {
    async fn list_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        location_id: Option<Uuid>,
    ) -> Result<Vec<MarketFactor>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.stay_date >= from && f.stay_date <= to)
            .filter(|f| match location_id {
                None => f.location_id.is_none(),
                Some(loc) => f.location_id.is_none() || f.location_id == Some(loc),
            })
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryOccupancy {
    rows: Mutex<HashMap<(Uuid, NaiveDate), f64>>,
}

impl InMemoryOccupancy {
    pub fn insert(&self, room_type_id: Uuid, stay_date: NaiveDate, occupancy_pct: f64) {
        self.rows
            .lock()
            .unwrap()
            .insert((room_type_id, stay_date), occupancy_pct);
    }
}

#[async_trait]
impl OccupancyProvider for InMemoryOccupancy {
    async fn occupancy_by_date(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DateOccupancy>, RepoError> {
        let mut rows: Vec<DateOccupancy> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|((id, date), _)| *id == room_type_id && *date >= from && *date <= to)
            .map(|((_, date), pct)| DateOccupancy {
                stay_date: *date,
                occupancy_pct: *pct,
            })
            .collect();
        rows.sort_by_key(|r| r.stay_date);
        Ok(rows)
    }
}

#[derive(Default)]
pub struct InMemoryListingPrices {
    rows: Mutex<HashMap<(Uuid, NaiveDate), ListingPrice>>,
}

impl InMemoryListingPrices {
    pub fn get(&self, room_type_id: Uuid, stay_date: NaiveDate) -> Option<ListingPrice> {
        self.rows
            .lock()
            .unwrap()
            .get(&(room_type_id, stay_date))
            .cloned()
    }
}

#[async_trait]
impl ListingPriceRepository for InMemoryListingPrices {
    async fn upsert_suggested(&self, prices: &[SuggestedPrice]) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().unwrap();
        for price in prices {
            let cell = rows
                .entry((price.room_type_id, price.stay_date))
                .or_insert_with(|| ListingPrice {
                    room_type_id: price.room_type_id,
                    stay_date: price.stay_date,
                    suggested_price: None,
                    override_price: None,
                    locked: false,
                });
            // Only the engine-owned column changes
            cell.suggested_price = Some(price.suggested_price);
        }
        Ok(())
    }

    async fn set_override(
        &self,
        room_type_id: Uuid,
        stay_date: NaiveDate,
        price: Option<f64>,
        locked: bool,
    ) -> Result<ListingPrice, RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let cell = rows
            .entry((room_type_id, stay_date))
            .or_insert_with(|| ListingPrice {
                room_type_id,
                stay_date,
                suggested_price: None,
                override_price: None,
                locked: false,
            });
        cell.override_price = price;
        cell.locked = locked;
        Ok(cell.clone())
    }

    async fn list_range(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ListingPrice>, RepoError> {
        let mut rows: Vec<ListingPrice> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.room_type_id == room_type_id && p.stay_date >= from && p.stay_date <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.stay_date);
        Ok(rows)
    }
}

#[derive(Default)]
pub struct InMemoryAudits {
    rows: Mutex<Vec<PricingAudit>>,
}

impl InMemoryAudits {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl PricingAuditRepository for InMemoryAudits {
    async fn insert_batch(&self, rows: &[PricingAudit]) -> Result<(), RepoError> {
        self.rows.lock().unwrap().extend_from_slice(rows);
        Ok(())
    }

    async fn latest_for(
        &self,
        room_type_id: Uuid,
        stay_date: NaiveDate,
    ) -> Result<Option<PricingAudit>, RepoError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.room_type_id == room_type_id && a.stay_date == stay_date)
            .max_by_key(|a| a.created_at)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryRuns {
    rows: Mutex<Vec<PricingRun>>,
}

impl InMemoryRuns {
    pub fn get(&self, id: Uuid) -> Option<PricingRun> {
        self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }

    pub fn all(&self) -> Vec<PricingRun> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl PricingRunRepository for InMemoryRuns {
    async fn create_run(&self, run: &PricingRun) -> Result<(), RepoError> {
        self.rows.lock().unwrap().push(run.clone());
        Ok(())
    }

    async fn finish_run(
        &self,
        id: Uuid,
        finished_at: DateTime<Utc>,
        notes: &str,
    ) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().unwrap();
        let run = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| format!("pricing run {id} not found"))?;
        run.finished_at = Some(finished_at);
        run.notes = Some(notes.to_string());
        Ok(())
    }

    async fn list_recent(
        &self,
        room_type_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PricingRun>, RepoError> {
        let mut rows: Vec<PricingRun> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.room_type_id == room_type_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}

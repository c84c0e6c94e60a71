use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use vela_core::models::{MarketFactor, PricingAudit, PricingRun, RoomType, SuggestedPrice};
use vela_core::repository::{
    ListingPriceRepository, MarketFactorRepository, OccupancyProvider, PricingAuditRepository,
    PricingRulesRepository, PricingRunRepository, RepoError, RoomTypeRepository,
    SeasonalityRepository,
};
use vela_pricing::{
    CalculationParams, DateFactors, PriceCalculator, PricingRules, SeasonalityResolver,
};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Room type not found: {0}")]
    RoomTypeNotFound(Uuid),

    #[error("Room type '{name}' has invalid pricing bounds: {reason}")]
    InvalidPricingBounds { name: String, reason: String },

    #[error("Failed to load {what}: {source}")]
    LoadFailed {
        what: &'static str,
        #[source]
        source: RepoError,
    },

    #[error("Failed to persist {what}: {source}")]
    WriteFailed {
        what: &'static str,
        #[source]
        source: RepoError,
    },
}

/// Summary of one completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub priced: usize,
}

/// The injected data-access dependencies of the engine.
#[derive(Clone)]
pub struct EngineStores {
    pub room_types: Arc<dyn RoomTypeRepository>,
    pub rules: Arc<dyn PricingRulesRepository>,
    pub seasonality: Arc<dyn SeasonalityRepository>,
    pub market_factors: Arc<dyn MarketFactorRepository>,
    pub occupancy: Arc<dyn OccupancyProvider>,
    pub listing_prices: Arc<dyn ListingPriceRepository>,
    pub audits: Arc<dyn PricingAuditRepository>,
    pub runs: Arc<dyn PricingRunRepository>,
}

/// Drives one end-to-end pricing computation over a date range for one
/// room type: loads one consistent input snapshot, prices every date the
/// occupancy signal covers, then bulk-writes suggested prices and the
/// audit trail.
pub struct PricingRunOrchestrator {
    stores: EngineStores,
}

impl PricingRunOrchestrator {
    pub fn new(stores: EngineStores) -> Self {
        Self { stores }
    }

    pub async fn run(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        location_id: Option<Uuid>,
    ) -> Result<RunOutcome, RunError> {
        let started_at = Utc::now();
        let run = PricingRun {
            id: Uuid::new_v4(),
            room_type_id,
            from_date: from,
            to_date: to,
            started_at,
            finished_at: None,
            notes: None,
        };

        // A run that fails later leaves this record dangling (no
        // finished_at); re-running is the recovery mechanism.
        self.stores
            .runs
            .create_run(&run)
            .await
            .map_err(|source| RunError::WriteFailed {
                what: "pricing run record",
                source,
            })?;

        let room_type = self
            .stores
            .room_types
            .get_room_type(room_type_id)
            .await
            .map_err(|source| RunError::LoadFailed {
                what: "room type",
                source,
            })?
            .ok_or(RunError::RoomTypeNotFound(room_type_id))?;
        let (base_price, min_price, max_price) = pricing_bounds(&room_type)?;
        info!(run_id = %run.id, room_type = %room_type.name, %from, %to, "Starting pricing run");

        let rules = self
            .stores
            .rules
            .get_rules(room_type_id)
            .await
            .map_err(|source| RunError::LoadFailed {
                what: "pricing rules",
                source,
            })?
            .unwrap_or_default();

        let market = self
            .stores
            .market_factors
            .list_range(from, to, location_id)
            .await
            .map_err(|source| RunError::LoadFailed {
                what: "market factors",
                source,
            })?;
        let market_by_date = index_by_date(market);

        let occupancy = self
            .stores
            .occupancy
            .occupancy_by_date(room_type_id, from, to)
            .await
            .map_err(|source| RunError::LoadFailed {
                what: "occupancy",
                source,
            })?;

        // Seasonality degrades to neutral instead of failing the run
        let resolver = match self.stores.seasonality.list_active(location_id).await {
            Ok(rows) => SeasonalityResolver::new(rows),
            Err(error) => {
                warn!(%error, "Seasonality load failed, pricing with neutral multiplier");
                SeasonalityResolver::neutral()
            }
        };

        let today = started_at.date_naive();
        let mut prices = Vec::with_capacity(occupancy.len());
        let mut audit_rows = Vec::with_capacity(occupancy.len());

        for day in &occupancy {
            let factors = date_factors(
                market_by_date.get(&day.stay_date),
                resolver.resolve(day.stay_date),
            );
            let days_out = (day.stay_date - today).num_days().max(0);

            let quote = PriceCalculator::calculate(&CalculationParams {
                base_price,
                min_price,
                max_price,
                date: day.stay_date,
                length_of_stay: 1,
                days_out,
                factors,
                rules: &rules,
                occupancy_pct: day.occupancy_pct,
            });

            prices.push(SuggestedPrice {
                room_type_id,
                stay_date: day.stay_date,
                suggested_price: quote.final_price,
            });
            audit_rows.push(PricingAudit {
                id: Uuid::new_v4(),
                run_id: run.id,
                room_type_id,
                stay_date: day.stay_date,
                breakdown: quote.breakdown,
                created_at: started_at,
            });
        }

        self.stores
            .listing_prices
            .upsert_suggested(&prices)
            .await
            .map_err(|source| RunError::WriteFailed {
                what: "listing prices",
                source,
            })?;
        self.stores
            .audits
            .insert_batch(&audit_rows)
            .await
            .map_err(|source| RunError::WriteFailed {
                what: "pricing audit rows",
                source,
            })?;

        let finished_at = Utc::now();
        let notes = format!(
            "priced {} dates in {} ms",
            prices.len(),
            (finished_at - started_at).num_milliseconds()
        );
        self.stores
            .runs
            .finish_run(run.id, finished_at, &notes)
            .await
            .map_err(|source| RunError::WriteFailed {
                what: "pricing run record",
                source,
            })?;
        info!(run_id = %run.id, priced = prices.len(), "Pricing run finished");

        Ok(RunOutcome {
            run_id: run.id,
            priced: prices.len(),
        })
    }
}

/// Extract validated pricing bounds, failing fast with the room-type name.
fn pricing_bounds(room_type: &RoomType) -> Result<(f64, f64, f64), RunError> {
    let field = |name: &str, value: Option<f64>| -> Result<f64, RunError> {
        match value {
            Some(v) if v > 0.0 => Ok(v),
            Some(_) => Err(RunError::InvalidPricingBounds {
                name: room_type.name.clone(),
                reason: format!("{name} must be positive"),
            }),
            None => Err(RunError::InvalidPricingBounds {
                name: room_type.name.clone(),
                reason: format!("{name} is not set"),
            }),
        }
    };

    Ok((
        field("base_price", room_type.base_price)?,
        field("min_price", room_type.min_price)?,
        field("max_price", room_type.max_price)?,
    ))
}

/// Index market rows by date; a location-specific row shadows the global
/// row for the same date.
fn index_by_date(rows: Vec<MarketFactor>) -> HashMap<NaiveDate, MarketFactor> {
    let mut by_date: HashMap<NaiveDate, MarketFactor> = HashMap::new();
    for row in rows {
        match by_date.get(&row.stay_date) {
            Some(existing) if existing.location_id.is_some() && row.location_id.is_none() => {}
            _ => {
                by_date.insert(row.stay_date, row);
            }
        }
    }
    by_date
}

fn date_factors(market: Option<&MarketFactor>, seasonality: f64) -> DateFactors {
    match market {
        Some(row) => DateFactors {
            seasonality,
            demand: row.demand,
            comp_pressure: row.comp_pressure_auto,
            manual_multiplier: row.manual_multiplier,
            events_weight: row.events_weight,
            pickup_signal: row.pickup_z,
            availability_signal: row.availability_z,
            comp_price_signal: row.comp_price_z,
        },
        None => DateFactors {
            seasonality,
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use vela_core::memory::{
        InMemoryAudits, InMemoryListingPrices, InMemoryMarketFactors, InMemoryOccupancy,
        InMemoryPricingRules, InMemoryRoomTypes, InMemoryRuns, InMemorySeasonality,
    };
    use vela_core::models::RoomType;
    use vela_pricing::SeasonalitySetting;

    struct Fixture {
        room_types: Arc<InMemoryRoomTypes>,
        rules: Arc<InMemoryPricingRules>,
        seasonality: Arc<InMemorySeasonality>,
        market_factors: Arc<InMemoryMarketFactors>,
        occupancy: Arc<InMemoryOccupancy>,
        listing_prices: Arc<InMemoryListingPrices>,
        audits: Arc<InMemoryAudits>,
        runs: Arc<InMemoryRuns>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                room_types: Arc::new(InMemoryRoomTypes::default()),
                rules: Arc::new(InMemoryPricingRules::default()),
                seasonality: Arc::new(InMemorySeasonality::default()),
                market_factors: Arc::new(InMemoryMarketFactors::default()),
                occupancy: Arc::new(InMemoryOccupancy::default()),
                listing_prices: Arc::new(InMemoryListingPrices::default()),
                audits: Arc::new(InMemoryAudits::default()),
                runs: Arc::new(InMemoryRuns::default()),
            }
        }

        fn orchestrator(&self) -> PricingRunOrchestrator {
            PricingRunOrchestrator::new(EngineStores {
                room_types: self.room_types.clone(),
                rules: self.rules.clone(),
                seasonality: self.seasonality.clone(),
                market_factors: self.market_factors.clone(),
                occupancy: self.occupancy.clone(),
                listing_prices: self.listing_prices.clone(),
                audits: self.audits.clone(),
                runs: self.runs.clone(),
            })
        }

        fn seed_room_type(&self, base: f64, min: f64, max: f64) -> Uuid {
            let id = Uuid::new_v4();
            self.room_types.insert(RoomType {
                id,
                name: "Deluxe Double".to_string(),
                location_id: None,
                base_price: Some(base),
                min_price: Some(min),
                max_price: Some(max),
                is_active: true,
            });
            id
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn future_date(days: i64) -> NaiveDate {
        Utc::now().date_naive() + chrono::Duration::days(days)
    }

    #[tokio::test]
    async fn test_run_prices_every_occupancy_date_with_one_audit_each() {
        let fx = Fixture::new();
        let room_type_id = fx.seed_room_type(10000.0, 8000.0, 15000.0);
        let from = future_date(10);
        for offset in 0..3 {
            fx.occupancy
                .insert(room_type_id, from + chrono::Duration::days(offset), 55.0);
        }

        let outcome = fx
            .orchestrator()
            .run(room_type_id, from, from + chrono::Duration::days(2), None)
            .await
            .unwrap();

        assert_eq!(outcome.priced, 3);
        assert_eq!(fx.audits.len(), 3);
        for offset in 0..3 {
            let cell = fx
                .listing_prices
                .get(room_type_id, from + chrono::Duration::days(offset))
                .unwrap();
            assert_eq!(cell.suggested_price, Some(10000.0));
        }
        let run = fx.runs.get(outcome.run_id).unwrap();
        assert!(run.finished_at.is_some());
        assert!(run.notes.unwrap().contains("priced 3 dates"));
    }

    #[tokio::test]
    async fn test_run_never_touches_override_or_lock() {
        let fx = Fixture::new();
        let room_type_id = fx.seed_room_type(10000.0, 8000.0, 15000.0);
        let stay = future_date(5);
        fx.occupancy.insert(room_type_id, stay, 50.0);

        fx.listing_prices
            .set_override(room_type_id, stay, Some(19999.0), true)
            .await
            .unwrap();

        fx.orchestrator()
            .run(room_type_id, stay, stay, None)
            .await
            .unwrap();

        let cell = fx.listing_prices.get(room_type_id, stay).unwrap();
        assert_eq!(cell.suggested_price, Some(10000.0));
        assert_eq!(cell.override_price, Some(19999.0));
        assert!(cell.locked);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent_for_suggested_prices() {
        let fx = Fixture::new();
        let room_type_id = fx.seed_room_type(12000.0, 9000.0, 20000.0);
        let stay = future_date(20);
        fx.occupancy.insert(room_type_id, stay, 83.2);
        fx.market_factors.insert(MarketFactor {
            stay_date: stay,
            location_id: None,
            demand: 1.15,
            comp_pressure_auto: 0.97,
            manual_multiplier: 1.0,
            events_weight: 0.5,
            pickup_z: 0.2,
            availability_z: -0.1,
            comp_price_z: 0.0,
        });

        fx.orchestrator()
            .run(room_type_id, stay, stay, None)
            .await
            .unwrap();
        let first = fx.listing_prices.get(room_type_id, stay).unwrap();

        fx.orchestrator()
            .run(room_type_id, stay, stay, None)
            .await
            .unwrap();
        let second = fx.listing_prices.get(room_type_id, stay).unwrap();

        assert_eq!(first.suggested_price, second.suggested_price);
        // The audit trail is append-only: one row per run
        assert_eq!(fx.audits.len(), 2);
    }

    #[tokio::test]
    async fn test_market_and_seasonality_shape_the_price() {
        let fx = Fixture::new();
        let room_type_id = fx.seed_room_type(10000.0, 5000.0, 30000.0);
        let stay = future_date(15);
        fx.occupancy.insert(room_type_id, stay, 50.0);
        fx.market_factors.insert(MarketFactor {
            stay_date: stay,
            location_id: None,
            demand: 1.2,
            comp_pressure_auto: 1.0,
            manual_multiplier: 1.0,
            events_weight: 0.0,
            pickup_z: 0.0,
            availability_z: 0.0,
            comp_price_z: 0.0,
        });
        fx.seasonality.insert(SeasonalitySetting {
            id: Uuid::new_v4(),
            location_id: None,
            season_name: "High".to_string(),
            start_date: stay - chrono::Duration::days(30),
            end_date: stay + chrono::Duration::days(30),
            multiplier: 1.25,
            year_recurring: false,
            is_active: true,
            display_order: 1,
        });

        fx.orchestrator()
            .run(room_type_id, stay, stay, None)
            .await
            .unwrap();

        let cell = fx.listing_prices.get(room_type_id, stay).unwrap();
        // 10000 * 1.25 (season) * 1.2 (demand)
        assert_eq!(cell.suggested_price, Some(15000.0));
        let audit = fx.audits.latest_for(room_type_id, stay).await.unwrap().unwrap();
        assert_eq!(audit.breakdown.seasonality, 1.25);
        assert_eq!(audit.breakdown.demand, 1.2);
    }

    #[tokio::test]
    async fn test_invalid_bounds_abort_before_any_write() {
        let fx = Fixture::new();
        let id = Uuid::new_v4();
        fx.room_types.insert(RoomType {
            id,
            name: "Broken Suite".to_string(),
            location_id: None,
            base_price: None,
            min_price: Some(8000.0),
            max_price: Some(15000.0),
            is_active: true,
        });
        fx.occupancy.insert(id, future_date(3), 50.0);

        let err = fx
            .orchestrator()
            .run(id, future_date(3), future_date(3), None)
            .await
            .unwrap_err();

        match err {
            RunError::InvalidPricingBounds { name, reason } => {
                assert_eq!(name, "Broken Suite");
                assert!(reason.contains("base_price"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(fx.audits.is_empty());
        assert!(fx.listing_prices.get(id, future_date(3)).is_none());
        // The started run record dangles, never finished
        let runs = fx.runs.all();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].finished_at.is_none());
    }

    #[tokio::test]
    async fn test_unknown_room_type_fails() {
        let fx = Fixture::new();
        let err = fx
            .orchestrator()
            .run(Uuid::new_v4(), date(2025, 1, 1), date(2025, 1, 2), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::RoomTypeNotFound(_)));
    }

    struct FailingSeasonality;

    #[async_trait]
    impl SeasonalityRepository for FailingSeasonality {
        async fn list_active(
            &self,
            _location_id: Option<Uuid>,
        ) -> Result<Vec<SeasonalitySetting>, RepoError> {
            Err("seasonality backend unavailable".into())
        }
    }

    #[tokio::test]
    async fn test_seasonality_failure_degrades_to_neutral() {
        let fx = Fixture::new();
        let room_type_id = fx.seed_room_type(10000.0, 8000.0, 15000.0);
        let stay = future_date(7);
        fx.occupancy.insert(room_type_id, stay, 50.0);

        let orchestrator = PricingRunOrchestrator::new(EngineStores {
            seasonality: Arc::new(FailingSeasonality),
            room_types: fx.room_types.clone(),
            rules: fx.rules.clone(),
            market_factors: fx.market_factors.clone(),
            occupancy: fx.occupancy.clone(),
            listing_prices: fx.listing_prices.clone(),
            audits: fx.audits.clone(),
            runs: fx.runs.clone(),
        });

        orchestrator.run(room_type_id, stay, stay, None).await.unwrap();

        let cell = fx.listing_prices.get(room_type_id, stay).unwrap();
        assert_eq!(cell.suggested_price, Some(10000.0));
    }

    struct FailingOccupancy;

    #[async_trait]
    impl OccupancyProvider for FailingOccupancy {
        async fn occupancy_by_date(
            &self,
            _room_type_id: Uuid,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<vela_core::models::DateOccupancy>, RepoError> {
            Err("occupancy backend unavailable".into())
        }
    }

    #[tokio::test]
    async fn test_occupancy_failure_aborts_the_run() {
        let fx = Fixture::new();
        let room_type_id = fx.seed_room_type(10000.0, 8000.0, 15000.0);

        let orchestrator = PricingRunOrchestrator::new(EngineStores {
            occupancy: Arc::new(FailingOccupancy),
            room_types: fx.room_types.clone(),
            rules: fx.rules.clone(),
            seasonality: fx.seasonality.clone(),
            market_factors: fx.market_factors.clone(),
            listing_prices: fx.listing_prices.clone(),
            audits: fx.audits.clone(),
            runs: fx.runs.clone(),
        });

        let err = orchestrator
            .run(room_type_id, future_date(1), future_date(5), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::LoadFailed { what: "occupancy", .. }));
        assert!(fx.audits.is_empty());
    }

    #[tokio::test]
    async fn test_location_specific_market_row_shadows_global() {
        let fx = Fixture::new();
        let location = Uuid::new_v4();
        let room_type_id = fx.seed_room_type(10000.0, 5000.0, 30000.0);
        let stay = future_date(9);
        fx.occupancy.insert(room_type_id, stay, 50.0);

        let neutral = MarketFactor {
            stay_date: stay,
            location_id: None,
            demand: 1.5,
            comp_pressure_auto: 1.0,
            manual_multiplier: 1.0,
            events_weight: 0.0,
            pickup_z: 0.0,
            availability_z: 0.0,
            comp_price_z: 0.0,
        };
        fx.market_factors.insert(neutral.clone());
        fx.market_factors.insert(MarketFactor {
            location_id: Some(location),
            demand: 1.1,
            ..neutral
        });

        fx.orchestrator()
            .run(room_type_id, stay, stay, Some(location))
            .await
            .unwrap();

        let cell = fx.listing_prices.get(room_type_id, stay).unwrap();
        assert_eq!(cell.suggested_price, Some(11000.0));
    }
}

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use vela_core::models::{DateOccupancy, MarketFactor};
use vela_core::repository::{MarketFactorRepository, OccupancyProvider, RepoError};

/// Reads the externally produced market signal rows.
pub struct PostgresMarketFactorRepository {
    pool: PgPool,
}

impl PostgresMarketFactorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MarketRow {
    stay_date: NaiveDate,
    location_id: Option<Uuid>,
    demand: f64,
    comp_pressure_auto: f64,
    manual_multiplier: f64,
    events_weight: f64,
    pickup_z: f64,
    availability_z: f64,
    comp_price_z: f64,
}

impl From<MarketRow> for MarketFactor {
    fn from(row: MarketRow) -> Self {
        MarketFactor {
            stay_date: row.stay_date,
            location_id: row.location_id,
            demand: row.demand,
            comp_pressure_auto: row.comp_pressure_auto,
            manual_multiplier: row.manual_multiplier,
            events_weight: row.events_weight,
            pickup_z: row.pickup_z,
            availability_z: row.availability_z,
            comp_price_z: row.comp_price_z,
        }
    }
}

const MARKET_COLUMNS: &str = "stay_date, location_id, demand, comp_pressure_auto, \
                              manual_multiplier, events_weight, pickup_z, availability_z, comp_price_z";

#[async_trait]
impl MarketFactorRepository for PostgresMarketFactorRepository {
    async fn list_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        location_id: Option<Uuid>,
    ) -> Result<Vec<MarketFactor>, RepoError> {
        let rows: Vec<MarketRow> = if let Some(location_id) = location_id {
            sqlx::query_as(&format!(
                "SELECT {MARKET_COLUMNS} FROM market_factors
                 WHERE stay_date BETWEEN $1 AND $2
                   AND (location_id IS NULL OR location_id = $3)
                 ORDER BY stay_date"
            ))
            .bind(from)
            .bind(to)
            .bind(location_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(&format!(
                "SELECT {MARKET_COLUMNS} FROM market_factors
                 WHERE stay_date BETWEEN $1 AND $2 AND location_id IS NULL
                 ORDER BY stay_date"
            ))
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.into_iter().map(MarketFactor::from).collect())
    }
}

/// Reads the occupancy signal the booking aggregation maintains.
pub struct PostgresOccupancyProvider {
    pool: PgPool,
}

impl PostgresOccupancyProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OccupancyRow {
    stay_date: NaiveDate,
    occupancy_pct: f64,
}

#[async_trait]
impl OccupancyProvider for PostgresOccupancyProvider {
    async fn occupancy_by_date(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DateOccupancy>, RepoError> {
        let rows: Vec<OccupancyRow> = sqlx::query_as(
            "SELECT stay_date, occupancy_pct FROM occupancy_by_date
             WHERE room_type_id = $1 AND stay_date BETWEEN $2 AND $3
             ORDER BY stay_date",
        )
        .bind(room_type_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DateOccupancy {
                stay_date: row.stay_date,
                occupancy_pct: row.occupancy_pct,
            })
            .collect())
    }
}

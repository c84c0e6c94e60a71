use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vela_core::models::{PricingAudit, PricingRun};
use vela_core::repository::{PricingAuditRepository, PricingRunRepository, RepoError};
use vela_pricing::PriceBreakdown;

pub struct PostgresPricingAuditRepository {
    pool: PgPool,
}

impl PostgresPricingAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    run_id: Uuid,
    room_type_id: Uuid,
    stay_date: NaiveDate,
    base_price: f64,
    seasonality: f64,
    dow_factor: f64,
    lead_time_factor: f64,
    los_factor: f64,
    demand: f64,
    comp_pressure: f64,
    manual_multiplier: f64,
    events_weight: f64,
    occupancy_factor: f64,
    occupancy_pct: f64,
    orphan_factor: f64,
    pickup_signal: f64,
    availability_signal: f64,
    comp_price_signal: f64,
    unclamped_price: f64,
    final_price: f64,
    created_at: DateTime<Utc>,
}

impl From<AuditRow> for PricingAudit {
    fn from(row: AuditRow) -> Self {
        PricingAudit {
            id: row.id,
            run_id: row.run_id,
            room_type_id: row.room_type_id,
            stay_date: row.stay_date,
            breakdown: PriceBreakdown {
                base_price: row.base_price,
                seasonality: row.seasonality,
                dow_factor: row.dow_factor,
                lead_time_factor: row.lead_time_factor,
                los_factor: row.los_factor,
                demand: row.demand,
                comp_pressure: row.comp_pressure,
                manual_multiplier: row.manual_multiplier,
                events_weight: row.events_weight,
                occupancy_factor: row.occupancy_factor,
                occupancy_pct: row.occupancy_pct,
                orphan_factor: row.orphan_factor,
                pickup_signal: row.pickup_signal,
                availability_signal: row.availability_signal,
                comp_price_signal: row.comp_price_signal,
                unclamped_price: row.unclamped_price,
                final_price: row.final_price,
            },
            created_at: row.created_at,
        }
    }
}

const AUDIT_COLUMNS: &str = "id, run_id, room_type_id, stay_date, base_price, seasonality, \
    dow_factor, lead_time_factor, los_factor, demand, comp_pressure, manual_multiplier, \
    events_weight, occupancy_factor, occupancy_pct, orphan_factor, pickup_signal, \
    availability_signal, comp_price_signal, unclamped_price, final_price, created_at";

#[async_trait]
impl PricingAuditRepository for PostgresPricingAuditRepository {
    async fn insert_batch(&self, rows: &[PricingAudit]) -> Result<(), RepoError> {
        for audit in rows {
            let b = &audit.breakdown;
            sqlx::query(&format!(
                "INSERT INTO pricing_audits ({AUDIT_COLUMNS})
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                         $15, $16, $17, $18, $19, $20, $21, $22)"
            ))
            .bind(audit.id)
            .bind(audit.run_id)
            .bind(audit.room_type_id)
            .bind(audit.stay_date)
            .bind(b.base_price)
            .bind(b.seasonality)
            .bind(b.dow_factor)
            .bind(b.lead_time_factor)
            .bind(b.los_factor)
            .bind(b.demand)
            .bind(b.comp_pressure)
            .bind(b.manual_multiplier)
            .bind(b.events_weight)
            .bind(b.occupancy_factor)
            .bind(b.occupancy_pct)
            .bind(b.orphan_factor)
            .bind(b.pickup_signal)
            .bind(b.availability_signal)
            .bind(b.comp_price_signal)
            .bind(b.unclamped_price)
            .bind(b.final_price)
            .bind(audit.created_at)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    async fn latest_for(
        &self,
        room_type_id: Uuid,
        stay_date: NaiveDate,
    ) -> Result<Option<PricingAudit>, RepoError> {
        let row: Option<AuditRow> = sqlx::query_as(&format!(
            "SELECT {AUDIT_COLUMNS} FROM pricing_audits
             WHERE room_type_id = $1 AND stay_date = $2
             ORDER BY created_at DESC
             LIMIT 1"
        ))
        .bind(room_type_id)
        .bind(stay_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PricingAudit::from))
    }
}

pub struct PostgresPricingRunRepository {
    pool: PgPool,
}

impl PostgresPricingRunRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RunRow {
    id: Uuid,
    room_type_id: Uuid,
    from_date: NaiveDate,
    to_date: NaiveDate,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    notes: Option<String>,
}

impl From<RunRow> for PricingRun {
    fn from(row: RunRow) -> Self {
        PricingRun {
            id: row.id,
            room_type_id: row.room_type_id,
            from_date: row.from_date,
            to_date: row.to_date,
            started_at: row.started_at,
            finished_at: row.finished_at,
            notes: row.notes,
        }
    }
}

#[async_trait]
impl PricingRunRepository for PostgresPricingRunRepository {
    async fn create_run(&self, run: &PricingRun) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO pricing_runs (id, room_type_id, from_date, to_date, started_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(run.id)
        .bind(run.room_type_id)
        .bind(run.from_date)
        .bind(run.to_date)
        .bind(run.started_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn finish_run(
        &self,
        id: Uuid,
        finished_at: DateTime<Utc>,
        notes: &str,
    ) -> Result<(), RepoError> {
        sqlx::query("UPDATE pricing_runs SET finished_at = $1, notes = $2 WHERE id = $3")
            .bind(finished_at)
            .bind(notes)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_recent(
        &self,
        room_type_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PricingRun>, RepoError> {
        let rows: Vec<RunRow> = sqlx::query_as(
            "SELECT id, room_type_id, from_date, to_date, started_at, finished_at, notes
             FROM pricing_runs
             WHERE room_type_id = $1
             ORDER BY started_at DESC
             LIMIT $2",
        )
        .bind(room_type_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PricingRun::from).collect())
    }
}

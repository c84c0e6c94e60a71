use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use vela_core::repository::{RepoError, SeasonalityRepository};
use vela_pricing::SeasonalitySetting;

pub struct PostgresSeasonalityRepository {
    pool: PgPool,
}

impl PostgresSeasonalityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SeasonRow {
    id: Uuid,
    location_id: Option<Uuid>,
    season_name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    multiplier: f64,
    year_recurring: bool,
    is_active: bool,
    display_order: i32,
}

impl From<SeasonRow> for SeasonalitySetting {
    fn from(row: SeasonRow) -> Self {
        SeasonalitySetting {
            id: row.id,
            location_id: row.location_id,
            season_name: row.season_name,
            start_date: row.start_date,
            end_date: row.end_date,
            multiplier: row.multiplier,
            year_recurring: row.year_recurring,
            is_active: row.is_active,
            display_order: row.display_order,
        }
    }
}

const COLUMNS: &str = "id, location_id, season_name, start_date, end_date, \
                       multiplier, year_recurring, is_active, display_order";

#[async_trait]
impl SeasonalityRepository for PostgresSeasonalityRepository {
    async fn list_active(
        &self,
        location_id: Option<Uuid>,
    ) -> Result<Vec<SeasonalitySetting>, RepoError> {
        let rows: Vec<SeasonRow> = if let Some(location_id) = location_id {
            sqlx::query_as(&format!(
                "SELECT {COLUMNS} FROM seasonality_settings
                 WHERE is_active = TRUE AND (location_id IS NULL OR location_id = $1)
                 ORDER BY display_order"
            ))
            .bind(location_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(&format!(
                "SELECT {COLUMNS} FROM seasonality_settings
                 WHERE is_active = TRUE AND location_id IS NULL
                 ORDER BY display_order"
            ))
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.into_iter().map(SeasonalitySetting::from).collect())
    }
}

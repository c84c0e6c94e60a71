use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use vela_core::models::{ListingPrice, SuggestedPrice};
use vela_core::repository::{ListingPriceRepository, RepoError};

pub struct PostgresListingPriceRepository {
    pool: PgPool,
}

impl PostgresListingPriceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    room_type_id: Uuid,
    stay_date: NaiveDate,
    suggested_price: Option<f64>,
    override_price: Option<f64>,
    locked: bool,
}

impl From<ListingRow> for ListingPrice {
    fn from(row: ListingRow) -> Self {
        ListingPrice {
            room_type_id: row.room_type_id,
            stay_date: row.stay_date,
            suggested_price: row.suggested_price,
            override_price: row.override_price,
            locked: row.locked,
        }
    }
}

#[async_trait]
impl ListingPriceRepository for PostgresListingPriceRepository {
    async fn upsert_suggested(&self, prices: &[SuggestedPrice]) -> Result<(), RepoError> {
        // The upsert only ever touches suggested_price; override_price
        // and locked stay exactly as humans left them.
        for price in prices {
            sqlx::query(
                "INSERT INTO listing_prices (room_type_id, stay_date, suggested_price, updated_at)
                 VALUES ($1, $2, $3, NOW())
                 ON CONFLICT (room_type_id, stay_date)
                 DO UPDATE SET suggested_price = EXCLUDED.suggested_price, updated_at = NOW()",
            )
            .bind(price.room_type_id)
            .bind(price.stay_date)
            .bind(price.suggested_price)
            .execute(&self.pool)
            .await?;
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
        let row: ListingRow = sqlx::query_as(
            "INSERT INTO listing_prices (room_type_id, stay_date, override_price, locked, updated_at)
             VALUES ($1, $2, $3, $4, NOW())
             ON CONFLICT (room_type_id, stay_date)
             DO UPDATE SET override_price = EXCLUDED.override_price,
                           locked = EXCLUDED.locked,
                           updated_at = NOW()
             RETURNING room_type_id, stay_date, suggested_price, override_price, locked",
        )
        .bind(room_type_id)
        .bind(stay_date)
        .bind(price)
        .bind(locked)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_range(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ListingPrice>, RepoError> {
        let rows: Vec<ListingRow> = sqlx::query_as(
            "SELECT room_type_id, stay_date, suggested_price, override_price, locked
             FROM listing_prices
             WHERE room_type_id = $1 AND stay_date BETWEEN $2 AND $3
             ORDER BY stay_date",
        )
        .bind(room_type_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ListingPrice::from).collect())
    }
}

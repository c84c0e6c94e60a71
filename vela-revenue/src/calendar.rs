use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use vela_core::models::{ListingPrice, PricingAudit};
use vela_core::repository::{ListingPriceRepository, PricingAuditRepository, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("No pricing data for room type {room_type_id} on {stay_date}")]
    NoData {
        room_type_id: Uuid,
        stay_date: NaiveDate,
    },

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

/// One displayable calendar cell. The override, when present, takes
/// display precedence over the engine's suggestion and may legitimately
/// sit outside the room type's price bounds.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub stay_date: NaiveDate,
    pub price: Option<f64>,
    pub has_override: bool,
    pub locked: bool,
}

/// Thin read/write surface over listing prices and the audit trail,
/// consumed by the surrounding application.
pub struct CalendarService {
    listing_prices: Arc<dyn ListingPriceRepository>,
    audits: Arc<dyn PricingAuditRepository>,
}

impl CalendarService {
    pub fn new(
        listing_prices: Arc<dyn ListingPriceRepository>,
        audits: Arc<dyn PricingAuditRepository>,
    ) -> Self {
        Self {
            listing_prices,
            audits,
        }
    }

    pub async fn calendar(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarDay>, CalendarError> {
        let rows = self
            .listing_prices
            .list_range(room_type_id, from, to)
            .await
            .map_err(|source| CalendarError::LoadFailed {
                what: "listing prices",
                source,
            })?;

        Ok(rows
            .into_iter()
            .map(|row| CalendarDay {
                stay_date: row.stay_date,
                price: row.override_price.or(row.suggested_price),
                has_override: row.override_price.is_some(),
                locked: row.locked,
            })
            .collect())
    }

    /// Writes only the human-owned columns; the engine's suggestion is
    /// left alone.
    pub async fn set_override(
        &self,
        room_type_id: Uuid,
        stay_date: NaiveDate,
        price: Option<f64>,
        locked: bool,
    ) -> Result<ListingPrice, CalendarError> {
        self.listing_prices
            .set_override(room_type_id, stay_date, price, locked)
            .await
            .map_err(|source| CalendarError::WriteFailed {
                what: "price override",
                source,
            })
    }

    /// The most recent audit snapshot for one cell.
    pub async fn breakdown(
        &self,
        room_type_id: Uuid,
        stay_date: NaiveDate,
    ) -> Result<PricingAudit, CalendarError> {
        self.audits
            .latest_for(room_type_id, stay_date)
            .await
            .map_err(|source| CalendarError::LoadFailed {
                what: "pricing audit",
                source,
            })?
            .ok_or(CalendarError::NoData {
                room_type_id,
                stay_date,
            })
    }
}

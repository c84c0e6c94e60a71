use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use vela_core::repository::{PricingRulesRepository, RepoError};
use vela_pricing::PricingRules;

pub struct PostgresPricingRulesRepository {
    pool: PgPool,
}

impl PostgresPricingRulesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RulesRow {
    rules: String,
}

#[async_trait]
impl PricingRulesRepository for PostgresPricingRulesRepository {
    async fn get_rules(&self, room_type_id: Uuid) -> Result<Option<PricingRules>, RepoError> {
        // The document is read as raw text so that bucket key order
        // survives; first match wins during lookups.
        let row = sqlx::query_as::<_, RulesRow>(
            "SELECT rules::text AS rules FROM pricing_rules WHERE room_type_id = $1",
        )
        .bind(room_type_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(serde_json::from_str(&row.rules)?)),
            None => Ok(None),
        }
    }
}

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use vela_core::models::RoomType;
use vela_core::repository::{RepoError, RoomTypeRepository};

pub struct PostgresRoomTypeRepository {
    pool: PgPool,
}

impl PostgresRoomTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RoomTypeRow {
    id: Uuid,
    name: String,
    location_id: Option<Uuid>,
    base_price: Option<f64>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    is_active: bool,
}

impl From<RoomTypeRow> for RoomType {
    fn from(row: RoomTypeRow) -> Self {
        RoomType {
            id: row.id,
            name: row.name,
            location_id: row.location_id,
            base_price: row.base_price,
            min_price: row.min_price,
            max_price: row.max_price,
            is_active: row.is_active,
        }
    }
}

#[async_trait]
impl RoomTypeRepository for PostgresRoomTypeRepository {
    async fn get_room_type(&self, id: Uuid) -> Result<Option<RoomType>, RepoError> {
        let row = sqlx::query_as::<_, RoomTypeRow>(
            "SELECT id, name, location_id, base_price, min_price, max_price, is_active
             FROM room_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RoomType::from))
    }
}

//! Database queries for room types, stay types and age policies

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::Result;
use crate::guests::HotelAgePolicy;
use crate::models::{RoomType, StayType};

/// Get a room type by id
pub async fn find_room_type<'e>(db: impl PgExecutor<'e>, id: Uuid) -> Result<Option<RoomType>> {
    let room_type = sqlx::query_as::<_, RoomType>(
        r#"
        SELECT
            id,
            hotel_id,
            name,
            base_occupancy,
            max_occupancy,
            extra_bed_slots,
            single_use_supplement
        FROM hotels_room_type
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(room_type)
}

/// Get a stay type by id
pub async fn find_stay_type<'e>(db: impl PgExecutor<'e>, id: Uuid) -> Result<Option<StayType>> {
    let stay_type = sqlx::query_as::<_, StayType>(
        r#"
        SELECT id, name, nights, included_board_type
        FROM hotels_stay_type
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(stay_type)
}

/// Get the age policy configured for a hotel
pub async fn find_age_policy<'e>(
    db: impl PgExecutor<'e>,
    hotel_id: Uuid,
) -> Result<Option<HotelAgePolicy>> {
    let policy = sqlx::query_as::<_, HotelAgePolicy>(
        r#"
        SELECT hotel_id, infant_max_age, child_max_age, adult_min_age
        FROM hotels_age_policy
        WHERE hotel_id = $1
        "#,
    )
    .bind(hotel_id)
    .fetch_optional(db)
    .await?;

    Ok(policy)
}

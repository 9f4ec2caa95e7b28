//! Database queries for allotment rows.

use chrono::NaiveDate;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::Result;

use super::models::Allotment;

/// Allotments for a room type with `from <= date <= until`
pub async fn find_allotments<'e>(
    db: impl PgExecutor<'e>,
    room_type_id: Uuid,
    from: NaiveDate,
    until: NaiveDate,
) -> Result<Vec<Allotment>> {
    let rows = sqlx::query_as::<_, Allotment>(
        r#"
        SELECT
            id, room_type_id, date, quantity, allocated, stop_sell,
            min_stay, max_stay, closed_to_arrival, closed_to_departure
        FROM inventory_allotment
        WHERE room_type_id = $1
          AND date >= $2
          AND date <= $3
        ORDER BY date
        "#,
    )
    .bind(room_type_id)
    .bind(from)
    .bind(until)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// Read one allotment and hold an exclusive row lock until the
/// surrounding transaction ends.
pub async fn lock_allotment<'e>(
    db: impl PgExecutor<'e>,
    room_type_id: Uuid,
    date: NaiveDate,
) -> Result<Option<Allotment>> {
    let row = sqlx::query_as::<_, Allotment>(
        r#"
        SELECT
            id, room_type_id, date, quantity, allocated, stop_sell,
            min_stay, max_stay, closed_to_arrival, closed_to_departure
        FROM inventory_allotment
        WHERE room_type_id = $1
          AND date = $2
        FOR UPDATE
        "#,
    )
    .bind(room_type_id)
    .bind(date)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Write a new allocated count for a locked row. Returns rows affected.
pub async fn set_allocated<'e>(db: impl PgExecutor<'e>, id: Uuid, allocated: i32) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE inventory_allotment
        SET allocated = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(allocated)
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}

/// Insert or update sellable capacity and restrictions. `allocated` is
/// owned by the mutator and is left alone on update.
pub async fn upsert_allotment<'e>(db: impl PgExecutor<'e>, allotment: &Allotment) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO inventory_allotment (
            id, room_type_id, date, quantity, allocated, stop_sell,
            min_stay, max_stay, closed_to_arrival, closed_to_departure
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (room_type_id, date) DO UPDATE
        SET quantity = EXCLUDED.quantity,
            stop_sell = EXCLUDED.stop_sell,
            min_stay = EXCLUDED.min_stay,
            max_stay = EXCLUDED.max_stay,
            closed_to_arrival = EXCLUDED.closed_to_arrival,
            closed_to_departure = EXCLUDED.closed_to_departure
        "#,
    )
    .bind(allotment.id)
    .bind(allotment.room_type_id)
    .bind(allotment.date)
    .bind(allotment.quantity)
    .bind(allotment.allocated)
    .bind(allotment.stop_sell)
    .bind(allotment.min_stay)
    .bind(allotment.max_stay)
    .bind(allotment.closed_to_arrival)
    .bind(allotment.closed_to_departure)
    .execute(db)
    .await?;

    Ok(())
}

//! Database queries for bookings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::Result;

use super::models::{Booking, BookingStatus};

const BOOKING_COLUMNS: &str = r#"
    id, room_type_id, stay_type_id, rate_plan_id,
    check_in_date, check_out_date, nights,
    adults, children, infants, extra_beds,
    status, total_price, currency,
    price_breakdown, rate_rule, guests,
    refund_amount, created_at, cancelled_at
"#;

/// Get a booking by id
pub async fn find_booking<'e>(db: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Booking>> {
    let sql = format!("SELECT {} FROM reservations_booking WHERE id = $1", BOOKING_COLUMNS);
    let booking = sqlx::query_as::<_, Booking>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(booking)
}

/// Get a booking and hold its row lock for the transaction
pub async fn lock_booking<'e>(db: impl PgExecutor<'e>, id: Uuid) -> Result<Option<Booking>> {
    let sql = format!(
        "SELECT {} FROM reservations_booking WHERE id = $1 FOR UPDATE",
        BOOKING_COLUMNS
    );
    let booking = sqlx::query_as::<_, Booking>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(booking)
}

pub async fn insert_booking<'e>(db: impl PgExecutor<'e>, booking: &Booking) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reservations_booking (
            id, room_type_id, stay_type_id, rate_plan_id,
            check_in_date, check_out_date, nights,
            adults, children, infants, extra_beds,
            status, total_price, currency,
            price_breakdown, rate_rule, guests,
            refund_amount, created_at, cancelled_at
        )
        VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
            $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
        )
        "#,
    )
    .bind(booking.id)
    .bind(booking.room_type_id)
    .bind(booking.stay_type_id)
    .bind(booking.rate_plan_id)
    .bind(booking.check_in_date)
    .bind(booking.check_out_date)
    .bind(booking.nights)
    .bind(booking.adults)
    .bind(booking.children)
    .bind(booking.infants)
    .bind(booking.extra_beds)
    .bind(booking.status.as_str())
    .bind(booking.total_price)
    .bind(&booking.currency)
    .bind(&booking.price_breakdown)
    .bind(&booking.rate_rule)
    .bind(&booking.guests)
    .bind(booking.refund_amount)
    .bind(booking.created_at)
    .bind(booking.cancelled_at)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn mark_cancelled<'e>(
    db: impl PgExecutor<'e>,
    id: Uuid,
    refund_amount: Decimal,
    cancelled_at: DateTime<Utc>,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE reservations_booking
        SET status = 'cancelled',
            refund_amount = $2,
            cancelled_at = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(refund_amount)
    .bind(cancelled_at)
    .execute(db)
    .await?;

    Ok(result.rows_affected())
}

/// Compare-and-set status update. Returns the updated booking, or `None`
/// if the row was not in status `from`.
pub async fn update_status<'e>(
    db: impl PgExecutor<'e>,
    id: Uuid,
    from: BookingStatus,
    to: BookingStatus,
) -> Result<Option<Booking>> {
    let sql = format!(
        "UPDATE reservations_booking SET status = $3 WHERE id = $1 AND status = $2 RETURNING {}",
        BOOKING_COLUMNS
    );
    let booking = sqlx::query_as::<_, Booking>(&sql)
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(db)
        .await?;

    Ok(booking)
}

//! PostgreSQL store.
//!
//! Allotment mutations run under `SELECT ... FOR UPDATE` inside one
//! transaction. Returning early with `?` drops the transaction, which rolls
//! back every row already touched in the call.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, error};
use uuid::Uuid;

use crate::allotments::{date_range, queries as allotment_queries};
use crate::allotments::{Allotment, AllotmentMutation, AllotmentOp};
use crate::bookings::{ensure_cancellable, queries as booking_queries};
use crate::bookings::{Booking, BookingStatus, Cancellation};
use crate::db;
use crate::error::{AppError, Result};
use crate::guests::HotelAgePolicy;
use crate::models::{RoomType, StayType};
use crate::pricing::models::{RatePlan, RateRule, RuleScope};
use crate::pricing::queries as pricing_queries;

use super::{find_overlap, lock_order, InventoryStore};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Lock, check and write each date in ascending order on an open transaction.
async fn mutate_locked(
    conn: &mut PgConnection,
    room_type_id: Uuid,
    dates: &[NaiveDate],
    op: AllotmentOp,
) -> Result<AllotmentMutation> {
    let mut dates_affected = Vec::with_capacity(dates.len());
    let mut total_changed = 0;

    for date in lock_order(dates) {
        let row = allotment_queries::lock_allotment(&mut *conn, room_type_id, date).await?;
        let allocated = op.apply(date, row.as_ref())?;

        // apply() only succeeds on an existing row
        if let Some(row) = row {
            if allocated != row.allocated {
                let updated = allotment_queries::set_allocated(&mut *conn, row.id, allocated).await?;
                if updated != 1 {
                    error!(
                        room_type_id = %room_type_id,
                        date = %date,
                        "Locked allotment row vanished before update"
                    );
                    return Err(AppError::Integrity(format!(
                        "allotment {} disappeared during {}",
                        row.id,
                        op.as_str()
                    )));
                }
                total_changed += 1;
            }
        }
        debug!(room_type_id = %room_type_id, date = %date, allocated, op = op.as_str(), "Allotment row updated");
        dates_affected.push(date);
    }

    Ok(AllotmentMutation {
        room_type_id,
        dates_affected,
        total_changed,
    })
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn room_type(&self, id: Uuid) -> Result<Option<RoomType>> {
        db::find_room_type(&self.pool, id).await
    }

    async fn stay_type(&self, id: Uuid) -> Result<Option<StayType>> {
        db::find_stay_type(&self.pool, id).await
    }

    async fn rate_plan(&self, id: Uuid) -> Result<Option<RatePlan>> {
        pricing_queries::find_rate_plan(&self.pool, id).await
    }

    async fn age_policy(&self, hotel_id: Uuid) -> Result<Option<HotelAgePolicy>> {
        db::find_age_policy(&self.pool, hotel_id).await
    }

    async fn find_rate_rule(
        &self,
        rate_plan_id: Uuid,
        scope: RuleScope,
        date: NaiveDate,
    ) -> Result<Option<RateRule>> {
        pricing_queries::find_rule_at_scope(&self.pool, rate_plan_id, scope, date).await
    }

    async fn insert_rate_rule(&self, rule: &RateRule) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        pricing_queries::lock_rate_plan(&mut *tx, rule.rate_plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("rate plan", rule.rate_plan_id))?;

        let existing =
            pricing_queries::rules_at_scope(&mut *tx, rule.rate_plan_id, rule.scope()).await?;
        if let Some(overlap) = find_overlap(&existing, rule) {
            return Err(AppError::Conflict(format!(
                "rate rule overlaps rule {} at {} scope",
                overlap.id,
                rule.scope().label()
            )));
        }

        pricing_queries::insert_rule(&mut *tx, rule).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn allotments(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Allotment>> {
        allotment_queries::find_allotments(&self.pool, room_type_id, from, until).await
    }

    async fn upsert_allotment(&self, allotment: &Allotment) -> Result<()> {
        allotment_queries::upsert_allotment(&self.pool, allotment).await
    }

    async fn mutate_allotments(
        &self,
        room_type_id: Uuid,
        dates: &[NaiveDate],
        op: AllotmentOp,
    ) -> Result<AllotmentMutation> {
        let mut tx = self.pool.begin().await?;
        let mutation = mutate_locked(&mut tx, room_type_id, dates, op).await?;
        tx.commit().await?;
        Ok(mutation)
    }

    async fn booking(&self, id: Uuid) -> Result<Option<Booking>> {
        booking_queries::find_booking(&self.pool, id).await
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<AllotmentMutation> {
        let mut tx = self.pool.begin().await?;

        let dates = date_range(booking.check_in_date, booking.check_out_date);
        let mutation =
            mutate_locked(&mut tx, booking.room_type_id, &dates, AllotmentOp::Reduce).await?;
        booking_queries::insert_booking(&mut *tx, booking).await?;

        tx.commit().await?;
        Ok(mutation)
    }

    async fn cancel_booking(&self, cancellation: &Cancellation) -> Result<AllotmentMutation> {
        let mut tx = self.pool.begin().await?;

        let booking = booking_queries::lock_booking(&mut *tx, cancellation.booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("booking", cancellation.booking_id))?;
        ensure_cancellable(&booking, cancellation.today)?;

        let dates = date_range(booking.check_in_date, booking.check_out_date);
        let mutation =
            mutate_locked(&mut tx, booking.room_type_id, &dates, AllotmentOp::Restore).await?;
        booking_queries::mark_cancelled(
            &mut *tx,
            booking.id,
            cancellation.refund_amount,
            cancellation.cancelled_at,
        )
        .await?;

        tx.commit().await?;
        Ok(mutation)
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking> {
        match booking_queries::update_status(&self.pool, booking_id, from, to).await? {
            Some(booking) => Ok(booking),
            None => match booking_queries::find_booking(&self.pool, booking_id).await? {
                Some(current) => Err(AppError::Conflict(format!(
                    "booking {} is {}, expected {}",
                    booking_id, current.status, from
                ))),
                None => Err(AppError::not_found("booking", booking_id)),
            },
        }
    }
}

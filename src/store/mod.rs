//! Persistence seam for the engine.
//!
//! Every operation that mutates allotments runs as one all-or-nothing
//! transaction holding an exclusive lock on each touched row, acquired in
//! ascending date order.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::allotments::{Allotment, AllotmentMutation, AllotmentOp};
use crate::bookings::{Booking, BookingStatus, Cancellation};
use crate::error::Result;
use crate::guests::HotelAgePolicy;
use crate::models::{RoomType, StayType};
use crate::pricing::models::{RatePlan, RateRule, RuleScope};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn room_type(&self, id: Uuid) -> Result<Option<RoomType>>;

    async fn stay_type(&self, id: Uuid) -> Result<Option<StayType>>;

    async fn rate_plan(&self, id: Uuid) -> Result<Option<RatePlan>>;

    async fn age_policy(&self, hotel_id: Uuid) -> Result<Option<HotelAgePolicy>>;

    /// Most recently created rule at exactly `scope` whose range covers `date`.
    async fn find_rate_rule(
        &self,
        rate_plan_id: Uuid,
        scope: RuleScope,
        date: NaiveDate,
    ) -> Result<Option<RateRule>>;

    /// Insert a rule, rejecting one that overlaps another rule of the same
    /// plan at the same scope.
    async fn insert_rate_rule(&self, rule: &RateRule) -> Result<()>;

    /// Rows for `room_type_id` with `from <= date <= until`, ascending.
    async fn allotments(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Allotment>>;

    async fn upsert_allotment(&self, allotment: &Allotment) -> Result<()>;

    /// Apply `op` to every date, in one transaction.
    async fn mutate_allotments(
        &self,
        room_type_id: Uuid,
        dates: &[NaiveDate],
        op: AllotmentOp,
    ) -> Result<AllotmentMutation>;

    async fn booking(&self, id: Uuid) -> Result<Option<Booking>>;

    /// Reduce the stay's allotment and write the booking in one transaction.
    async fn insert_booking(&self, booking: &Booking) -> Result<AllotmentMutation>;

    /// Re-check cancellability under lock, restore the stay's allotment and
    /// mark the booking cancelled, in one transaction.
    async fn cancel_booking(&self, cancellation: &Cancellation) -> Result<AllotmentMutation>;

    /// Compare-and-set status change for non-cancelling transitions.
    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking>;
}

/// Rule at the same scope whose dates overlap `candidate`, if any.
pub fn find_overlap<'a>(
    existing: impl IntoIterator<Item = &'a RateRule>,
    candidate: &RateRule,
) -> Option<&'a RateRule> {
    existing.into_iter().find(|r| {
        r.id != candidate.id
            && r.rate_plan_id == candidate.rate_plan_id
            && r.scope() == candidate.scope()
            && r.overlaps(candidate)
    })
}

/// Sort and dedupe dates so locks are always taken in ascending order.
pub fn lock_order(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut ordered = dates.to_vec();
    ordered.sort_unstable();
    ordered.dedup();
    ordered
}

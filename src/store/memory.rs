//! In-process store.
//!
//! A single mutex stands in for row locks: every mutation computes all of
//! its row updates first and writes them only if none failed, which gives the
//! same all-or-nothing result as a rolled back database transaction.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::allotments::{date_range, Allotment, AllotmentMutation, AllotmentOp};
use crate::bookings::{ensure_cancellable, Booking, BookingStatus, Cancellation};
use crate::error::{AppError, Result};
use crate::guests::HotelAgePolicy;
use crate::models::{RoomType, StayType};
use crate::pricing::models::{RatePlan, RateRule, RuleScope};

use super::{find_overlap, lock_order, InventoryStore};

#[derive(Debug, Default)]
struct MemoryState {
    room_types: HashMap<Uuid, RoomType>,
    stay_types: HashMap<Uuid, StayType>,
    rate_plans: HashMap<Uuid, RatePlan>,
    age_policies: HashMap<Uuid, HotelAgePolicy>,
    rate_rules: Vec<RateRule>,
    allotments: BTreeMap<(Uuid, NaiveDate), Allotment>,
    bookings: HashMap<Uuid, Booking>,
}

impl MemoryState {
    /// Stage `op` over `dates`; nothing is written.
    fn plan_mutation(
        &self,
        room_type_id: Uuid,
        dates: &[NaiveDate],
        op: AllotmentOp,
    ) -> Result<Vec<(NaiveDate, i32)>> {
        lock_order(dates)
            .into_iter()
            .map(|date| {
                let row = self.allotments.get(&(room_type_id, date));
                let allocated = op.apply(date, row)?;
                Ok((date, allocated))
            })
            .collect()
    }

    fn commit_mutation(
        &mut self,
        room_type_id: Uuid,
        staged: Vec<(NaiveDate, i32)>,
    ) -> AllotmentMutation {
        let mut total_changed = 0;
        let mut dates_affected = Vec::with_capacity(staged.len());
        for (date, allocated) in staged {
            if let Some(row) = self.allotments.get_mut(&(room_type_id, date)) {
                if row.allocated != allocated {
                    total_changed += 1;
                }
                row.allocated = allocated;
            }
            dates_affected.push(date);
        }
        AllotmentMutation {
            room_type_id,
            dates_affected,
            total_changed,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking writer never leaves staged changes behind
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_room_type(&self, room_type: RoomType) {
        self.state().room_types.insert(room_type.id, room_type);
    }

    pub fn add_stay_type(&self, stay_type: StayType) {
        self.state().stay_types.insert(stay_type.id, stay_type);
    }

    pub fn add_rate_plan(&self, plan: RatePlan) {
        self.state().rate_plans.insert(plan.id, plan);
    }

    pub fn add_age_policy(&self, hotel_id: Uuid, policy: HotelAgePolicy) {
        self.state().age_policies.insert(hotel_id, policy);
    }

    /// Add a rule without the overlap check, for seeding ambiguous data.
    pub fn add_rate_rule_unchecked(&self, rule: RateRule) {
        self.state().rate_rules.push(rule);
    }

    pub fn add_allotment(&self, allotment: Allotment) {
        self.state()
            .allotments
            .insert((allotment.room_type_id, allotment.date), allotment);
    }

    pub fn remove_allotment(&self, room_type_id: Uuid, date: NaiveDate) -> Option<Allotment> {
        self.state().allotments.remove(&(room_type_id, date))
    }

    pub fn allotment(&self, room_type_id: Uuid, date: NaiveDate) -> Option<Allotment> {
        self.state().allotments.get(&(room_type_id, date)).cloned()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn room_type(&self, id: Uuid) -> Result<Option<RoomType>> {
        Ok(self.state().room_types.get(&id).cloned())
    }

    async fn stay_type(&self, id: Uuid) -> Result<Option<StayType>> {
        Ok(self.state().stay_types.get(&id).cloned())
    }

    async fn rate_plan(&self, id: Uuid) -> Result<Option<RatePlan>> {
        Ok(self.state().rate_plans.get(&id).cloned())
    }

    async fn age_policy(&self, hotel_id: Uuid) -> Result<Option<HotelAgePolicy>> {
        Ok(self.state().age_policies.get(&hotel_id).cloned())
    }

    async fn find_rate_rule(
        &self,
        rate_plan_id: Uuid,
        scope: RuleScope,
        date: NaiveDate,
    ) -> Result<Option<RateRule>> {
        let state = self.state();
        let rule = state
            .rate_rules
            .iter()
            .filter(|r| r.rate_plan_id == rate_plan_id && scope.matches(r) && r.covers(date))
            .max_by_key(|r| r.created_at)
            .cloned();
        Ok(rule)
    }

    async fn insert_rate_rule(&self, rule: &RateRule) -> Result<()> {
        let mut state = self.state();
        if !state.rate_plans.contains_key(&rule.rate_plan_id) {
            return Err(AppError::not_found("rate plan", rule.rate_plan_id));
        }
        if let Some(existing) = find_overlap(&state.rate_rules, rule) {
            return Err(AppError::Conflict(format!(
                "rate rule overlaps rule {} at {} scope",
                existing.id,
                rule.scope().label()
            )));
        }
        state.rate_rules.push(rule.clone());
        Ok(())
    }

    async fn allotments(
        &self,
        room_type_id: Uuid,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Allotment>> {
        let state = self.state();
        Ok(state
            .allotments
            .range((room_type_id, from)..=(room_type_id, until))
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn upsert_allotment(&self, allotment: &Allotment) -> Result<()> {
        let mut state = self.state();
        let key = (allotment.room_type_id, allotment.date);
        match state.allotments.get_mut(&key) {
            Some(row) => {
                let allocated = row.allocated;
                *row = Allotment {
                    id: row.id,
                    allocated,
                    ..allotment.clone()
                };
            }
            None => {
                state.allotments.insert(key, allotment.clone());
            }
        }
        Ok(())
    }

    async fn mutate_allotments(
        &self,
        room_type_id: Uuid,
        dates: &[NaiveDate],
        op: AllotmentOp,
    ) -> Result<AllotmentMutation> {
        let mut state = self.state();
        let staged = state.plan_mutation(room_type_id, dates, op)?;
        Ok(state.commit_mutation(room_type_id, staged))
    }

    async fn booking(&self, id: Uuid) -> Result<Option<Booking>> {
        Ok(self.state().bookings.get(&id).cloned())
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<AllotmentMutation> {
        let mut state = self.state();
        if state.bookings.contains_key(&booking.id) {
            return Err(AppError::Conflict(format!(
                "booking {} already exists",
                booking.id
            )));
        }
        let dates = date_range(booking.check_in_date, booking.check_out_date);
        let staged = state.plan_mutation(booking.room_type_id, &dates, AllotmentOp::Reduce)?;
        let mutation = state.commit_mutation(booking.room_type_id, staged);
        state.bookings.insert(booking.id, booking.clone());
        Ok(mutation)
    }

    async fn cancel_booking(&self, cancellation: &Cancellation) -> Result<AllotmentMutation> {
        let mut state = self.state();
        let booking = state
            .bookings
            .get(&cancellation.booking_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("booking", cancellation.booking_id))?;
        ensure_cancellable(&booking, cancellation.today)?;

        let dates = date_range(booking.check_in_date, booking.check_out_date);
        let staged = state.plan_mutation(booking.room_type_id, &dates, AllotmentOp::Restore)?;
        let mutation = state.commit_mutation(booking.room_type_id, staged);

        if let Some(stored) = state.bookings.get_mut(&booking.id) {
            stored.status = BookingStatus::Cancelled;
            stored.refund_amount = Some(cancellation.refund_amount);
            stored.cancelled_at = Some(cancellation.cancelled_at);
        }
        Ok(mutation)
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Booking> {
        let mut state = self.state();
        let booking = state
            .bookings
            .get_mut(&booking_id)
            .ok_or_else(|| AppError::not_found("booking", booking_id))?;
        if booking.status != from {
            return Err(AppError::Conflict(format!(
                "booking {} is {}, expected {}",
                booking_id, booking.status, from
            )));
        }
        booking.status = to;
        Ok(booking.clone())
    }
}

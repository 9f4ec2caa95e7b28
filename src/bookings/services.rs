//! Booking service functions.
//!
//! Validation reads only. Inventory and the booking row change together in
//! one store transaction, so a failed reduce never leaves a booking behind.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::allotments::{checkout_date, date_range, mutator::restore_fault, AllotmentMutation};
use crate::availability::{check_availability, AvailabilityQuery, AvailabilityResult};
use crate::cache::AppCache;
use crate::error::{AppError, FieldIssue, Result};
use crate::guests::HotelAgePolicy;
use crate::store::InventoryStore;

use super::lifecycle::{
    days_until_checkin, ensure_cancellable, ensure_transition, CancellationPolicy,
};
use super::models::{Booking, BookingStatus, Cancellation};
use super::requests::BookingRequest;
use super::validation::{snapshot_guests, validate_booking, ValidationContext, ValidationResult};

/// Validation result plus the lookups create needs afterwards
struct Assessment {
    validation: ValidationResult,
    availability: Option<AvailabilityResult>,
    age_policy: Arc<HotelAgePolicy>,
}

async fn assess(
    store: &dyn InventoryStore,
    cache: &AppCache,
    request: &BookingRequest,
    today: NaiveDate,
) -> Result<Assessment> {
    let room_type = cache.room_type(store, request.room_type_id).await?;
    let stay_type = cache.stay_type(store, request.stay_type_id).await?;
    let rate_plan = cache.rate_plan(store, request.rate_plan_id).await?;
    let age_policy = cache
        .age_policy(store, room_type.as_ref().and_then(|r| r.hotel_id))
        .await?;

    // Availability needs every catalogue entry and a stay it can price;
    // anything else is left for validation to report
    let priceable = request.positive_nights().filter(|nights| {
        checkout_date(request.check_in_date, *nights).is_ok()
            && request.occupancy().check_bounds().is_ok()
    });
    let availability = match (&room_type, &stay_type, &rate_plan, priceable) {
        (Some(_), Some(_), Some(_), Some(nights)) => {
            let query = AvailabilityQuery {
                stay_type_id: request.stay_type_id,
                room_type_id: request.room_type_id,
                rate_plan_id: request.rate_plan_id,
                checkin_date: request.check_in_date,
                nights,
                occupancy: request.occupancy(),
            };
            Some(check_availability(store, cache, &query).await?)
        }
        _ => None,
    };

    let mut validation = validate_booking(&ValidationContext {
        request,
        today,
        room_type: room_type.as_deref(),
        stay_type: stay_type.as_deref(),
        age_policy: &age_policy,
        availability: availability.as_ref(),
    });
    if rate_plan.is_none() {
        validation.is_valid = false;
        validation
            .errors
            .push(FieldIssue::new("rate_plan_id", "rate plan not found"));
    }

    Ok(Assessment {
        validation,
        availability,
        age_policy,
    })
}

/// Run every booking check without touching inventory.
pub async fn validate_booking_request(
    store: &dyn InventoryStore,
    cache: &AppCache,
    request: &BookingRequest,
    today: NaiveDate,
) -> Result<ValidationResult> {
    Ok(assess(store, cache, request, today).await?.validation)
}

/// Validate, price and persist a booking, taking one allotment unit per night.
///
/// # Arguments
/// * `today` - Date the booking is made on; check-in must not be before it
/// * `now` - Creation timestamp stored on the booking
pub async fn create_booking(
    store: &dyn InventoryStore,
    cache: &AppCache,
    request: &BookingRequest,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Booking> {
    let assessment = assess(store, cache, request, today).await?;
    if !assessment.validation.is_valid {
        warn!(
            room_type_id = %request.room_type_id,
            check_in_date = %request.check_in_date,
            errors = assessment.validation.errors.len(),
            "Booking rejected by validation"
        );
        return Err(AppError::Validation(assessment.validation.errors));
    }

    // A valid booking always carries a priced availability result
    let availability = assessment
        .availability
        .ok_or_else(|| AppError::Internal("validated booking has no availability".into()))?;
    let (Some(breakdown), Some(rate_rule)) = (availability.breakdown, availability.rate_rule)
    else {
        return Err(AppError::Internal("validated booking has no price".into()));
    };

    let check_out_date = request
        .check_in_date
        .checked_add_days(Days::new(u64::from(breakdown.nights)))
        .ok_or_else(|| AppError::invalid("nights", "stay runs past the supported calendar"))?;
    let guests = snapshot_guests(request, &assessment.age_policy);

    let booking = Booking {
        id: Uuid::new_v4(),
        room_type_id: request.room_type_id,
        stay_type_id: request.stay_type_id,
        rate_plan_id: request.rate_plan_id,
        check_in_date: request.check_in_date,
        check_out_date,
        nights: request.nights,
        adults: to_count(request.adults)?,
        children: to_count(request.children)?,
        infants: to_count(request.infants)?,
        extra_beds: to_count(request.extra_beds)?,
        status: BookingStatus::Pending,
        total_price: breakdown.total_price,
        currency: breakdown.currency.clone(),
        price_breakdown: snapshot(&breakdown)?,
        rate_rule: snapshot(&rate_rule)?,
        guests: snapshot(&guests)?,
        refund_amount: None,
        created_at: now,
        cancelled_at: None,
    };

    let mutation = store.insert_booking(&booking).await?;

    info!(
        booking_id = %booking.id,
        room_type_id = %booking.room_type_id,
        check_in_date = %booking.check_in_date,
        nights = booking.nights,
        total_price = %booking.total_price,
        dates_reduced = mutation.total_changed,
        "Booking created"
    );
    Ok(booking)
}

fn to_count(value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| AppError::Internal(format!("count {} out of range", value)))
}

fn snapshot<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(format!("snapshot failed: {}", e)))
}

/// Outcome of a cancellation
#[derive(Debug, Clone, Serialize)]
pub struct CancellationOutcome {
    pub booking_id: Uuid,
    pub status: BookingStatus,
    #[serde(with = "rust_decimal::serde::str")]
    pub refund_amount: Decimal,
    pub currency: String,
    pub days_until_checkin: i64,
    pub dates_restored: Vec<NaiveDate>,
    pub total_restored: u32,
}

/// Cancel a booking, refund per `policy` and give its nights back.
pub async fn cancel_booking(
    store: &dyn InventoryStore,
    policy: &CancellationPolicy,
    booking_id: Uuid,
    now: DateTime<Utc>,
) -> Result<CancellationOutcome> {
    let today = now.date_naive();
    let booking = store
        .booking(booking_id)
        .await?
        .ok_or_else(|| AppError::not_found("booking", booking_id))?;
    ensure_cancellable(&booking, today)?;

    let days = days_until_checkin(&booking, today);
    let refund_amount = policy.refund_amount(booking.total_price, days);

    let mutation = store
        .cancel_booking(&Cancellation {
            booking_id,
            refund_amount,
            cancelled_at: now,
            today,
        })
        .await
        .map_err(|e| restore_fault(booking.room_type_id, e))?;

    info!(
        booking_id = %booking_id,
        days_until_checkin = days,
        refund_amount = %refund_amount,
        dates_restored = mutation.total_changed,
        "Booking cancelled"
    );

    Ok(CancellationOutcome {
        booking_id,
        status: BookingStatus::Cancelled,
        refund_amount,
        currency: booking.currency,
        days_until_checkin: days,
        dates_restored: mutation.dates_affected,
        total_restored: mutation.total_changed,
    })
}

/// Move a booking to `next` along the lifecycle. Cancellation goes through
/// [`cancel_booking`] so the refund and restore happen with it.
pub async fn transition_booking(
    store: &dyn InventoryStore,
    booking_id: Uuid,
    next: BookingStatus,
) -> Result<Booking> {
    if next == BookingStatus::Cancelled {
        return Err(AppError::invalid(
            "status",
            "use the cancel operation to cancel a booking",
        ));
    }
    let booking = store
        .booking(booking_id)
        .await?
        .ok_or_else(|| AppError::not_found("booking", booking_id))?;
    ensure_transition(&booking, next)?;

    let updated = store
        .update_booking_status(booking_id, booking.status, next)
        .await?;
    info!(
        booking_id = %booking_id,
        from = %booking.status,
        to = %next,
        "Booking status changed"
    );
    Ok(updated)
}

/// Report the nights a cancelled booking gave back.
///
/// Cancellation restores inventory in the same transaction that marks the
/// booking cancelled, so this never moves `allocated` again and repeated
/// calls return the same empty mutation. A booking that still holds its
/// nights is a conflict.
pub async fn restore_for_booking(
    store: &dyn InventoryStore,
    booking_id: Uuid,
) -> Result<AllotmentMutation> {
    let booking = store
        .booking(booking_id)
        .await?
        .ok_or_else(|| AppError::not_found("booking", booking_id))?;

    match booking.status {
        BookingStatus::Cancelled => {
            debug!(booking_id = %booking_id, "Booking nights already released");
            Ok(AllotmentMutation {
                room_type_id: booking.room_type_id,
                dates_affected: date_range(booking.check_in_date, booking.check_out_date),
                total_changed: 0,
            })
        }
        status if status.holds_inventory() => Err(AppError::Conflict(format!(
            "booking {} is {} and still holds its nights",
            booking_id, status
        ))),
        status => Err(AppError::Conflict(format!(
            "booking {} is {} and has no nights to release",
            booking_id, status
        ))),
    }
}

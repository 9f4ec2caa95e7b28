//! Booking validation.
//!
//! Every check runs and contributes to one result, so the caller sees all
//! problems at once. Nothing here writes; allotment changes happen only after
//! a booking passes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::allotments::MAX_STAY_NIGHTS;
use crate::availability::AvailabilityResult;
use crate::error::FieldIssue;
use crate::guests::{age_on, category_for_age, parse_birthdate, GuestCategory, HotelAgePolicy};
use crate::models::{RoomType, StayType};

use super::models::GuestSnapshot;
use super::requests::BookingRequest;

/// Pass/fail outcome with every error and warning found
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<FieldIssue>,
    pub warnings: Vec<FieldIssue>,
}

impl ValidationResult {
    fn from_issues(errors: Vec<FieldIssue>, warnings: Vec<FieldIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Everything the checks read, fetched up front.
///
/// Missing catalogue entries are `None` and reported as errors.
pub struct ValidationContext<'a> {
    pub request: &'a BookingRequest,
    pub today: NaiveDate,
    pub room_type: Option<&'a RoomType>,
    pub stay_type: Option<&'a StayType>,
    pub age_policy: &'a HotelAgePolicy,
    pub availability: Option<&'a AvailabilityResult>,
}

#[derive(Default)]
struct Findings {
    errors: Vec<FieldIssue>,
    warnings: Vec<FieldIssue>,
}

impl Findings {
    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldIssue::new(field, message));
    }

    fn warn(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(FieldIssue::new(field, message));
    }
}

/// Run all booking checks in order and collect the findings.
pub fn validate_booking(ctx: &ValidationContext<'_>) -> ValidationResult {
    let mut findings = Findings::default();

    check_nights(ctx, &mut findings);
    check_composition(ctx, &mut findings);
    check_dates(ctx, &mut findings);
    check_guests(ctx, &mut findings);
    check_price(ctx, &mut findings);

    ValidationResult::from_issues(findings.errors, findings.warnings)
}

fn check_nights(ctx: &ValidationContext<'_>, findings: &mut Findings) {
    let nights = ctx.request.nights;
    if nights <= 0 {
        findings.error("nights", "nights must be positive");
        return;
    }
    if nights.unsigned_abs() > MAX_STAY_NIGHTS {
        findings.error(
            "nights",
            format!("nights must be at most {}", MAX_STAY_NIGHTS),
        );
        return;
    }
    match ctx.stay_type {
        None => findings.error("stay_type_id", "stay type not found"),
        Some(stay) if stay.nights != nights => findings.error(
            "nights",
            format!(
                "stay type '{}' requires exactly {} nights, got {}",
                stay.name, stay.nights, nights
            ),
        ),
        Some(_) => {}
    }
}

fn check_composition(ctx: &ValidationContext<'_>, findings: &mut Findings) {
    let occupancy = ctx.request.occupancy();
    if occupancy.adults < 1 {
        findings.error("adults", "at least one adult is required");
    }

    let Some(room) = ctx.room_type else {
        findings.error("room_type_id", "room type not found");
        return;
    };

    let total = i64::from(occupancy.total_guests());
    let max = i64::from(room.max_occupancy);
    if total > max {
        findings.error(
            "occupancy",
            format!("{} guests exceed the maximum occupancy of {}", total, max),
        );
    } else if total == max {
        findings.warn("occupancy", "near max occupancy");
    }

    if i64::from(occupancy.extra_beds) > i64::from(room.extra_bed_slots) {
        findings.error(
            "extra_beds",
            format!(
                "{} extra beds requested, room allows {}",
                occupancy.extra_beds, room.extra_bed_slots
            ),
        );
    }
}

fn check_dates(ctx: &ValidationContext<'_>, findings: &mut Findings) {
    if ctx.request.check_in_date < ctx.today {
        findings.error("check_in_date", "check-in date is in the past");
    }
    if let Some(availability) = ctx.availability {
        for message in availability.messages() {
            findings.error("check_in_date", message);
        }
    }
}

fn check_guests(ctx: &ValidationContext<'_>, findings: &mut Findings) {
    let checkin = ctx.request.check_in_date;

    for (i, guest) in ctx.request.guests.iter().enumerate() {
        let category_field = format!("guests[{}].guest_category", i);

        let classified = match guest.birthdate.as_deref().filter(|s| !s.trim().is_empty()) {
            None => {
                findings.error(format!("guests[{}].birthdate", i), "birthdate is required");
                None
            }
            Some(raw) => match parse_birthdate(raw)
                .and_then(|birthdate| age_on(birthdate, checkin))
                .map(|age| category_for_age(age, ctx.age_policy))
            {
                Ok(actual) => Some(actual),
                Err(e) => {
                    findings.error(format!("guests[{}].birthdate", i), e.to_string());
                    None
                }
            },
        };

        let declared = match guest.guest_category.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<GuestCategory>() {
                Ok(category) => Some(category),
                Err(e) => {
                    findings.error(category_field.clone(), e.to_string());
                    None
                }
            },
        };

        if let (Some(declared), Some(actual)) = (declared, classified) {
            if declared != actual {
                findings.warn(
                    category_field,
                    format!(
                        "declared {} but guest is {} on check-in date",
                        declared, actual
                    ),
                );
            }
        }
    }
}

fn check_price(ctx: &ValidationContext<'_>, findings: &mut Findings) {
    match ctx.availability.and_then(|a| a.breakdown.as_ref()) {
        Some(breakdown) if breakdown.total_price > Decimal::ZERO => {}
        Some(_) => findings.error("total_price", "total price must be greater than zero"),
        None => findings.error("total_price", "no price available for this stay"),
    }
}

/// Classify every guest at check-in for the booking snapshot.
///
/// Only call on a request that passed validation; guests whose birthdate
/// cannot be classified are skipped.
pub fn snapshot_guests(
    request: &BookingRequest,
    policy: &HotelAgePolicy,
) -> Vec<GuestSnapshot> {
    request
        .guests
        .iter()
        .filter_map(|guest| {
            let birthdate = parse_birthdate(guest.birthdate.as_deref()?).ok()?;
            let age = age_on(birthdate, request.check_in_date).ok()?;
            Some(GuestSnapshot {
                name: guest.name.clone(),
                birthdate,
                age_at_checkin: age,
                category: category_for_age(age, policy),
            })
        })
        .collect()
}

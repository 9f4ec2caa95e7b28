//! Stay availability with per-date diagnostics.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

use crate::allotments::{checkout_date, stay_dates, Allotment};
use crate::cache::AppCache;
use crate::error::{AppError, Result};
use crate::models::StayType;
use crate::pricing::services::{quote, resolve_rate_rule};
use crate::store::InventoryStore;

use super::models::{
    AvailabilityIssue, AvailabilityQuery, AvailabilityResult, DateDiagnostic, StayRestrictions,
    UnavailableReason,
};

/// Inventory-side findings for a stay, before pricing
#[derive(Debug, Clone, PartialEq)]
pub struct StayAssessment {
    pub dates: Vec<DateDiagnostic>,
    pub restrictions: Option<StayRestrictions>,
    pub issues: Vec<AvailabilityIssue>,
}

/// Diagnose a single night from its allotment row.
pub fn diagnose_date(date: NaiveDate, row: Option<&Allotment>) -> DateDiagnostic {
    let reason = match row {
        None => Some(UnavailableReason::NoAllotment),
        Some(a) if a.stop_sell => Some(UnavailableReason::StopSell),
        Some(a) if a.remaining() <= 0 => Some(UnavailableReason::SoldOut),
        Some(_) => None,
    };
    DateDiagnostic {
        date,
        available: reason.is_none(),
        remaining: row.map(Allotment::remaining),
        stop_sell: row.is_some_and(|a| a.stop_sell),
        reason,
    }
}

/// Check every night in `[checkin, checkin + nights)` and the stay-level
/// restrictions. `allotments` may include the departure date row, which is
/// only consulted for closed-to-departure.
pub fn assess_stay(
    allotments: &[Allotment],
    checkin: NaiveDate,
    nights: u32,
    stay_type: &StayType,
) -> StayAssessment {
    let by_date: HashMap<NaiveDate, &Allotment> =
        allotments.iter().map(|a| (a.date, a)).collect();

    let dates: Vec<DateDiagnostic> = stay_dates(checkin, nights)
        .into_iter()
        .map(|date| diagnose_date(date, by_date.get(&date).copied()))
        .collect();

    let mut issues: Vec<AvailabilityIssue> = dates
        .iter()
        .filter_map(|d| d.reason.map(|r| AvailabilityIssue::new(r, Some(d.date))))
        .collect();

    let nights_i32 = i32::try_from(nights).unwrap_or(i32::MAX);
    if nights_i32 < stay_type.nights {
        issues.push(AvailabilityIssue::new(
            UnavailableReason::MinimumStayNotMet,
            None,
        ));
    }

    let checkout = checkin.checked_add_days(Days::new(u64::from(nights)));
    let departure = checkout.and_then(|d| by_date.get(&d).copied());

    let restrictions = by_date.get(&checkin).map(|arrival| StayRestrictions {
        min_stay: arrival.min_stay,
        max_stay: arrival.max_stay,
        closed_to_arrival: arrival.closed_to_arrival,
        closed_to_departure: departure.is_some_and(|d| d.closed_to_departure),
    });

    if let Some(r) = &restrictions {
        let already_short = issues
            .iter()
            .any(|i| i.reason == UnavailableReason::MinimumStayNotMet);
        if matches!(r.min_stay, Some(min) if nights_i32 < min) && !already_short {
            issues.push(AvailabilityIssue::new(
                UnavailableReason::MinimumStayNotMet,
                Some(checkin),
            ));
        }
        if matches!(r.max_stay, Some(max) if nights_i32 > max) {
            issues.push(AvailabilityIssue::new(
                UnavailableReason::MaximumStayExceeded,
                Some(checkin),
            ));
        }
        if r.closed_to_arrival {
            issues.push(AvailabilityIssue::new(
                UnavailableReason::ClosedToArrival,
                Some(checkin),
            ));
        }
        if r.closed_to_departure {
            issues.push(AvailabilityIssue::new(
                UnavailableReason::ClosedToDeparture,
                checkout,
            ));
        }
    }

    StayAssessment {
        dates,
        restrictions,
        issues,
    }
}

/// Check whether a stay can be sold and what it would cost.
///
/// The stay is available only if every night passes, no restriction is
/// violated and a rate rule resolves.
pub async fn check_availability(
    store: &dyn InventoryStore,
    cache: &AppCache,
    query: &AvailabilityQuery,
) -> Result<AvailabilityResult> {
    let checkout = checkout_date(query.checkin_date, query.nights)?;
    query.occupancy.check_bounds()?;
    let stay_type = cache
        .stay_type(store, query.stay_type_id)
        .await?
        .ok_or_else(|| AppError::not_found("stay type", query.stay_type_id))?;
    cache
        .room_type(store, query.room_type_id)
        .await?
        .ok_or_else(|| AppError::not_found("room type", query.room_type_id))?;

    // Departure row is included for closed-to-departure
    let allotments = store
        .allotments(query.room_type_id, query.checkin_date, checkout)
        .await?;
    let mut assessment = assess_stay(&allotments, query.checkin_date, query.nights, &stay_type);

    let resolved = resolve_rate_rule(
        store,
        cache,
        query.rate_plan_id,
        Some(query.stay_type_id),
        query.room_type_id,
        query.checkin_date,
    )
    .await?;

    let (breakdown, currency) = match &resolved {
        Some(r) => (Some(quote(r, query.occupancy, query.nights)), r.currency.clone()),
        None => {
            assessment.issues.push(AvailabilityIssue::new(
                UnavailableReason::NoRateAvailable,
                None,
            ));
            // resolve_rate_rule already loaded the plan into the cache
            let currency = cache
                .rate_plan(store, query.rate_plan_id)
                .await?
                .map(|plan| plan.currency.clone())
                .unwrap_or_default();
            (None, currency)
        }
    };

    let is_available = assessment.issues.is_empty();
    debug!(
        room_type_id = %query.room_type_id,
        checkin = %query.checkin_date,
        nights = query.nights,
        is_available,
        issues = assessment.issues.len(),
        "Availability checked"
    );

    Ok(AvailabilityResult {
        is_available,
        total_price: breakdown
            .as_ref()
            .map_or(Decimal::ZERO, |b| b.total_price),
        currency,
        breakdown,
        rate_rule: resolved,
        restrictions: assessment.restrictions,
        dates: assessment.dates,
        issues: assessment.issues,
    })
}

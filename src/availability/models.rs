//! Availability query and result types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::pricing::{Occupancy, PriceBreakdown, ResolvedRule};

/// Request to check whether a stay can be sold
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub stay_type_id: Uuid,
    pub room_type_id: Uuid,
    pub rate_plan_id: Uuid,
    pub checkin_date: NaiveDate,
    pub nights: u32,
    #[serde(flatten)]
    pub occupancy: Occupancy,
}

/// Why a date or a stay cannot be sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    NoAllotment,
    StopSell,
    SoldOut,
    MinimumStayNotMet,
    MaximumStayExceeded,
    ClosedToArrival,
    ClosedToDeparture,
    NoRateAvailable,
}

impl UnavailableReason {
    pub fn message(&self) -> &'static str {
        match self {
            UnavailableReason::NoAllotment => "no allotment configured",
            UnavailableReason::StopSell => "stop sell active",
            UnavailableReason::SoldOut => "no rooms available",
            UnavailableReason::MinimumStayNotMet => "minimum stay not met",
            UnavailableReason::MaximumStayExceeded => "maximum stay exceeded",
            UnavailableReason::ClosedToArrival => "closed to arrival",
            UnavailableReason::ClosedToDeparture => "closed to departure",
            UnavailableReason::NoRateAvailable => "no rate available",
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// State of one night of the stay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateDiagnostic {
    pub date: NaiveDate,
    pub available: bool,
    /// `None` when no allotment row exists
    pub remaining: Option<i32>,
    pub stop_sell: bool,
    pub reason: Option<UnavailableReason>,
}

/// One reason the stay fails, with the date it applies to if any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityIssue {
    pub reason: UnavailableReason,
    pub date: Option<NaiveDate>,
    pub message: String,
}

impl AvailabilityIssue {
    pub fn new(reason: UnavailableReason, date: Option<NaiveDate>) -> Self {
        let message = match date {
            Some(d) => format!("{} on {}", reason.message(), d),
            None => reason.message().to_string(),
        };
        Self {
            reason,
            date,
            message,
        }
    }
}

/// Stay restrictions read from the arrival and departure rows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StayRestrictions {
    pub min_stay: Option<i32>,
    pub max_stay: Option<i32>,
    pub closed_to_arrival: bool,
    pub closed_to_departure: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResult {
    pub is_available: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub currency: String,
    pub breakdown: Option<PriceBreakdown>,
    pub rate_rule: Option<ResolvedRule>,
    pub restrictions: Option<StayRestrictions>,
    pub dates: Vec<DateDiagnostic>,
    pub issues: Vec<AvailabilityIssue>,
}

impl AvailabilityResult {
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().map(|issue| issue.message.as_str())
    }
}

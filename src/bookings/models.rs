//! Booking records as written by the engine.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::guests::GuestCategory;

/// Linear booking lifecycle with cancellation as the only side exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::CheckedIn => "checked_in",
            BookingStatus::CheckedOut => "checked_out",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (CheckedIn, CheckedOut)
        )
    }

    /// Statuses still holding allotment
    pub fn holds_inventory(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::CheckedIn
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "checked_in" => Ok(BookingStatus::CheckedIn),
            "checked_out" => Ok(BookingStatus::CheckedOut),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status '{}'", other)),
        }
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Guest as classified on the check-in date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestSnapshot {
    pub name: String,
    pub birthdate: NaiveDate,
    pub age_at_checkin: u32,
    pub category: GuestCategory,
}

/// Booking from reservations_booking
///
/// `price_breakdown` and `rate_rule` are frozen copies taken at booking
/// time; later rule edits never change them.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub room_type_id: Uuid,
    pub stay_type_id: Uuid,
    pub rate_plan_id: Uuid,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub nights: i32,
    pub adults: i32,
    pub children: i32,
    pub infants: i32,
    pub extra_beds: i32,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub currency: String,
    pub price_breakdown: serde_json::Value,
    pub rate_rule: serde_json::Value,
    pub guests: serde_json::Value,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub refund_amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Cancellation to be applied atomically with the allotment restore
#[derive(Debug, Clone, PartialEq)]
pub struct Cancellation {
    pub booking_id: Uuid,
    pub refund_amount: Decimal,
    pub cancelled_at: DateTime<Utc>,
    /// Date the cancellation is evaluated on
    pub today: NaiveDate,
}

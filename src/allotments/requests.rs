//! Request DTOs for allotment API endpoints.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::FieldIssue;

use super::models::Allotment;

#[derive(Debug, Clone, Deserialize)]
pub struct ReduceRequest {
    pub room_type_id: Uuid,
    pub checkin_date: NaiveDate,
    pub nights: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestoreRequest {
    pub booking_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AllotmentRangeQuery {
    pub room_type_id: Uuid,
    pub from: NaiveDate,
    pub until: NaiveDate,
}

/// Sellable capacity and restrictions for one room type and date.
/// The allocated count is never set through this request.
#[derive(Debug, Clone, Deserialize)]
pub struct SetAllotmentRequest {
    pub room_type_id: Uuid,
    pub date: NaiveDate,
    pub quantity: i32,
    #[serde(default)]
    pub stop_sell: bool,
    #[serde(default)]
    pub min_stay: Option<i32>,
    #[serde(default)]
    pub max_stay: Option<i32>,
    #[serde(default)]
    pub closed_to_arrival: bool,
    #[serde(default)]
    pub closed_to_departure: bool,
}

impl SetAllotmentRequest {
    pub fn validate(&self) -> Vec<FieldIssue> {
        let mut issues = Vec::new();
        if self.quantity < 0 {
            issues.push(FieldIssue::new("quantity", "quantity must not be negative"));
        }
        if matches!(self.min_stay, Some(n) if n < 1) {
            issues.push(FieldIssue::new("min_stay", "min_stay must be at least 1"));
        }
        if matches!(self.max_stay, Some(n) if n < 1) {
            issues.push(FieldIssue::new("max_stay", "max_stay must be at least 1"));
        }
        if let (Some(min), Some(max)) = (self.min_stay, self.max_stay) {
            if min > max {
                issues.push(FieldIssue::new("max_stay", "max_stay is below min_stay"));
            }
        }
        issues
    }

    pub fn into_allotment(self) -> Allotment {
        Allotment {
            stop_sell: self.stop_sell,
            min_stay: self.min_stay,
            max_stay: self.max_stay,
            closed_to_arrival: self.closed_to_arrival,
            closed_to_departure: self.closed_to_departure,
            ..Allotment::new(self.room_type_id, self.date, self.quantity)
        }
    }
}

//! Request DTOs for booking API endpoints.

use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::pricing::Occupancy;

use super::models::BookingStatus;

/// One guest as entered by the caller
#[derive(Debug, Clone, Deserialize)]
pub struct GuestInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birthdate: Option<String>,
    /// Category the caller declared; checked against the age at check-in
    #[serde(default)]
    pub guest_category: Option<String>,
}

/// Request to validate or create a booking
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub room_type_id: Uuid,
    pub stay_type_id: Uuid,
    pub rate_plan_id: Uuid,
    pub check_in_date: NaiveDate,
    /// Signed so that zero and negative values reach validation
    pub nights: i32,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
    #[serde(default)]
    pub extra_beds: u32,
    #[serde(default)]
    pub guests: Vec<GuestInput>,
}

impl BookingRequest {
    pub fn occupancy(&self) -> Occupancy {
        Occupancy::new(self.adults, self.children, self.infants, self.extra_beds)
    }

    /// Nights as an unsigned count, `None` when not positive
    pub fn positive_nights(&self) -> Option<u32> {
        u32::try_from(self.nights).ok().filter(|n| *n > 0)
    }
}

/// Request to move a booking along its lifecycle
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChangeRequest {
    pub status: BookingStatus,
}

//! Per-date inventory rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Allotment from inventory_allotment, unique on (room_type_id, date)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Allotment {
    pub id: Uuid,
    pub room_type_id: Uuid,
    pub date: NaiveDate,
    pub quantity: i32,
    pub allocated: i32,
    pub stop_sell: bool,
    /// Arrival-date restriction on the length of stay
    pub min_stay: Option<i32>,
    pub max_stay: Option<i32>,
    pub closed_to_arrival: bool,
    pub closed_to_departure: bool,
}

impl Allotment {
    pub fn new(room_type_id: Uuid, date: NaiveDate, quantity: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_type_id,
            date,
            quantity,
            allocated: 0,
            stop_sell: false,
            min_stay: None,
            max_stay: None,
            closed_to_arrival: false,
            closed_to_departure: false,
        }
    }

    /// Units still sellable. Never stored.
    pub fn remaining(&self) -> i32 {
        self.quantity - self.allocated
    }
}

/// Result of a reduce or restore call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllotmentMutation {
    pub room_type_id: Uuid,
    pub dates_affected: Vec<NaiveDate>,
    /// Rows whose allocated count actually moved
    pub total_changed: u32,
}

//! Guest categories and per-hotel age policies.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Pricing category of a guest, derived from age at check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestCategory {
    Infant,
    Child,
    Adult,
}

impl GuestCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuestCategory::Infant => "infant",
            GuestCategory::Child => "child",
            GuestCategory::Adult => "adult",
        }
    }
}

impl fmt::Display for GuestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a category string outside adult/child/infant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown guest category '{0}', expected adult, child or infant")]
pub struct UnknownCategory(pub String);

impl FromStr for GuestCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "infant" => Ok(GuestCategory::Infant),
            "child" => Ok(GuestCategory::Child),
            "adult" => Ok(GuestCategory::Adult),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Age thresholds from hotels_age_policy
///
/// `infant_max_age` and `child_max_age` are exclusive upper bounds,
/// `adult_min_age` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct HotelAgePolicy {
    pub hotel_id: Option<Uuid>,
    pub infant_max_age: Option<i32>,
    pub child_max_age: Option<i32>,
    pub adult_min_age: i32,
}

impl HotelAgePolicy {
    /// Upper bound of the child tier. Falls back to `adult_min_age` for
    /// hotels that have no separate child band.
    pub fn effective_child_max_age(&self) -> i32 {
        self.child_max_age.unwrap_or(self.adult_min_age)
    }

    /// Check that present thresholds are strictly increasing.
    pub fn is_consistent(&self) -> bool {
        let child = self.effective_child_max_age();
        let infant_ok = self.infant_max_age.map_or(true, |i| i >= 0 && i < child);
        let child_ok = self.child_max_age.map_or(true, |c| c <= self.adult_min_age);
        infant_ok && child_ok
    }
}

impl Default for HotelAgePolicy {
    fn default() -> Self {
        Self {
            hotel_id: None,
            infant_max_age: Some(2),
            child_max_age: Some(12),
            adult_min_age: 18,
        }
    }
}

//! Room and stay type models.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Sellable inventory unit from hotels_room_type
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RoomType {
    pub id: Uuid,
    /// `None` for standalone house types
    pub hotel_id: Option<Uuid>,
    pub name: String,
    pub base_occupancy: i32,
    pub max_occupancy: i32,
    pub extra_bed_slots: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub single_use_supplement: Decimal,
}

impl RoomType {
    pub fn is_consistent(&self) -> bool {
        self.base_occupancy >= 1
            && self.max_occupancy >= self.base_occupancy
            && self.extra_bed_slots >= 0
            && self.single_use_supplement >= Decimal::ZERO
    }
}

/// Board included with a stay package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardType {
    #[serde(rename = "AI")]
    AllInclusive,
    #[serde(rename = "FB")]
    FullBoard,
    #[serde(rename = "HB")]
    HalfBoard,
    #[serde(rename = "BB")]
    BedAndBreakfast,
    #[serde(rename = "none")]
    RoomOnly,
}

impl BoardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoardType::AllInclusive => "AI",
            BoardType::FullBoard => "FB",
            BoardType::HalfBoard => "HB",
            BoardType::BedAndBreakfast => "BB",
            BoardType::RoomOnly => "none",
        }
    }
}

impl fmt::Display for BoardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AI" => Ok(BoardType::AllInclusive),
            "FB" => Ok(BoardType::FullBoard),
            "HB" => Ok(BoardType::HalfBoard),
            "BB" => Ok(BoardType::BedAndBreakfast),
            "none" | "" => Ok(BoardType::RoomOnly),
            other => Err(format!("unknown board type '{}'", other)),
        }
    }
}

impl TryFrom<String> for BoardType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Fixed-length package from hotels_stay_type
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct StayType {
    pub id: Uuid,
    pub name: String,
    /// Bookings of this package must be exactly this many nights
    pub nights: i32,
    #[sqlx(try_from = "String")]
    pub included_board_type: BoardType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_board_type_round_trips_codes() {
        for code in ["AI", "FB", "HB", "BB", "none"] {
            let board: BoardType = code.parse().unwrap();
            assert_eq!(board.as_str(), code);
        }
        assert!("XX".parse::<BoardType>().is_err());
    }

    #[test]
    fn test_room_type_consistency() {
        let mut room = RoomType {
            id: Uuid::new_v4(),
            hotel_id: None,
            name: "Double".to_string(),
            base_occupancy: 2,
            max_occupancy: 3,
            extra_bed_slots: 1,
            single_use_supplement: dec!(30),
        };
        assert!(room.is_consistent());

        room.max_occupancy = 1;
        assert!(!room.is_consistent());
    }
}

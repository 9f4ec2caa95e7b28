//! Request DTOs for pricing API endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::calculators::Occupancy;
use super::models::RateRule;

/// Request to price a stay
#[derive(Debug, Clone, Deserialize)]
pub struct PriceQuery {
    #[serde(default)]
    pub stay_type_id: Option<Uuid>,
    pub room_type_id: Uuid,
    pub rate_plan_id: Uuid,
    pub checkin_date: NaiveDate,
    pub nights: u32,
    #[serde(flatten)]
    pub occupancy: Occupancy,
}

/// Request to create a rate rule
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRateRuleRequest {
    pub rate_plan_id: Uuid,
    #[serde(default)]
    pub stay_type_id: Option<Uuid>,
    #[serde(default)]
    pub room_type_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::str")]
    pub price_per_adult: Decimal,
    #[serde(default, with = "rust_decimal::serde::str")]
    pub price_per_child: Decimal,
    #[serde(default, with = "rust_decimal::serde::str")]
    pub price_per_infant: Decimal,
    #[serde(default, with = "rust_decimal::serde::str")]
    pub price_per_extra_bed: Decimal,
    #[serde(default, with = "rust_decimal::serde::str")]
    pub single_use_supplement: Decimal,
    #[serde(default)]
    pub included_occupancy: Option<i32>,
    #[serde(default, with = "rust_decimal::serde::str")]
    pub price_per_extra_person: Decimal,
}

impl CreateRateRuleRequest {
    pub fn into_rule(self, id: Uuid, created_at: DateTime<Utc>) -> RateRule {
        RateRule {
            id,
            rate_plan_id: self.rate_plan_id,
            stay_type_id: self.stay_type_id,
            room_type_id: self.room_type_id,
            start_date: self.start_date,
            end_date: self.end_date,
            base_price: self.base_price,
            price_per_adult: self.price_per_adult,
            price_per_child: self.price_per_child,
            price_per_infant: self.price_per_infant,
            price_per_extra_bed: self.price_per_extra_bed,
            single_use_supplement: self.single_use_supplement,
            included_occupancy: self.included_occupancy,
            price_per_extra_person: self.price_per_extra_person,
            created_at,
        }
    }
}

//! Database models for pricing queries.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How a rate plan turns occupancy into a price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    /// Base price plus a supplement per guest and extra bed
    OccupancyBased,
    /// Unit price covers `included_occupancy` guests, extras pay per person
    UnitIncludedOccupancy,
}

impl PricingModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingModel::OccupancyBased => "occupancy_based",
            PricingModel::UnitIncludedOccupancy => "unit_included_occupancy",
        }
    }
}

impl fmt::Display for PricingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "occupancy_based" => Ok(PricingModel::OccupancyBased),
            "unit_included_occupancy" => Ok(PricingModel::UnitIncludedOccupancy),
            other => Err(format!("unknown pricing model '{}'", other)),
        }
    }
}

impl TryFrom<String> for PricingModel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// RatePlan from pricing_rate_plan
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RatePlan {
    pub id: Uuid,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub pricing_model: PricingModel,
    pub currency: String,
    pub is_active: bool,
}

/// RateRule from pricing_rate_rule
///
/// `stay_type_id` / `room_type_id` of `None` act as wildcards.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RateRule {
    pub id: Uuid,
    pub rate_plan_id: Uuid,
    pub stay_type_id: Option<Uuid>,
    pub room_type_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_adult: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_child: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_infant: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_extra_bed: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub single_use_supplement: Decimal,
    pub included_occupancy: Option<i32>,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_extra_person: Decimal,
    pub created_at: DateTime<Utc>,
}

impl RateRule {
    /// Check if the rule's inclusive date range covers `date`
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Check if two rules' date ranges share at least one day
    pub fn overlaps(&self, other: &RateRule) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }

    /// Specificity tier this rule sits at
    pub fn scope(&self) -> RuleScope {
        match (self.stay_type_id, self.room_type_id) {
            (Some(stay), Some(room)) => RuleScope::StayAndRoom { stay, room },
            (None, Some(room)) => RuleScope::Room { room },
            (Some(stay), None) => RuleScope::Stay { stay },
            (None, None) => RuleScope::Global,
        }
    }

    /// Collect problems that make the rule unusable for pricing.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.end_date < self.start_date {
            errors.push("end_date must not be before start_date".to_string());
        }
        let amounts = [
            ("base_price", self.base_price),
            ("price_per_adult", self.price_per_adult),
            ("price_per_child", self.price_per_child),
            ("price_per_infant", self.price_per_infant),
            ("price_per_extra_bed", self.price_per_extra_bed),
            ("single_use_supplement", self.single_use_supplement),
            ("price_per_extra_person", self.price_per_extra_person),
        ];
        for (field, amount) in amounts {
            if amount < Decimal::ZERO {
                errors.push(format!("{} must not be negative", field));
            }
        }
        if matches!(self.included_occupancy, Some(n) if n < 0) {
            errors.push("included_occupancy must not be negative".to_string());
        }
        errors
    }
}

/// Specificity tier of a rate rule, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleScope {
    StayAndRoom { stay: Uuid, room: Uuid },
    Room { room: Uuid },
    Stay { stay: Uuid },
    Global,
}

impl RuleScope {
    /// Fallback order for a lookup. Tiers that need a stay type are
    /// skipped when none is given.
    pub fn fallback_order(stay_type_id: Option<Uuid>, room_type_id: Uuid) -> Vec<RuleScope> {
        let mut tiers = Vec::with_capacity(4);
        if let Some(stay) = stay_type_id {
            tiers.push(RuleScope::StayAndRoom {
                stay,
                room: room_type_id,
            });
        }
        tiers.push(RuleScope::Room { room: room_type_id });
        if let Some(stay) = stay_type_id {
            tiers.push(RuleScope::Stay { stay });
        }
        tiers.push(RuleScope::Global);
        tiers
    }

    /// The nullable columns matching this tier, as (stay_type_id, room_type_id)
    pub fn columns(&self) -> (Option<Uuid>, Option<Uuid>) {
        match *self {
            RuleScope::StayAndRoom { stay, room } => (Some(stay), Some(room)),
            RuleScope::Room { room } => (None, Some(room)),
            RuleScope::Stay { stay } => (Some(stay), None),
            RuleScope::Global => (None, None),
        }
    }

    /// Exact match on both scope columns, NULL matching only NULL
    pub fn matches(&self, rule: &RateRule) -> bool {
        self.columns() == (rule.stay_type_id, rule.room_type_id)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RuleScope::StayAndRoom { .. } => "stay_and_room",
            RuleScope::Room { .. } => "room",
            RuleScope::Stay { .. } => "stay",
            RuleScope::Global => "global",
        }
    }
}

/// A rule together with the plan data needed to price it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRule {
    pub rule: RateRule,
    pub pricing_model: PricingModel,
    pub currency: String,
    pub scope: &'static str,
}

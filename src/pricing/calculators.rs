//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database access.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::models::{PricingModel, RateRule, ResolvedRule};

/// Included occupancy for unit pricing when the rule leaves it unset
pub const DEFAULT_INCLUDED_OCCUPANCY: i32 = 2;

/// Upper bound on any single count in an [`Occupancy`]
pub const MAX_OCCUPANCY_COUNT: u32 = 99;

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use hotel_inventory_core::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Guest composition of a stay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
    #[serde(default)]
    pub extra_beds: u32,
}

impl Occupancy {
    pub fn new(adults: u32, children: u32, infants: u32, extra_beds: u32) -> Self {
        Self {
            adults,
            children,
            infants,
            extra_beds,
        }
    }

    /// Guests counted against room capacity. Extra beds are not people.
    pub fn total_guests(&self) -> u32 {
        self.adults
            .saturating_add(self.children)
            .saturating_add(self.infants)
    }

    /// Guests counted against included occupancy. Infants ride free.
    pub fn chargeable_guests(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }

    /// Reject counts no room could hold before they reach the price math.
    pub fn check_bounds(&self) -> Result<(), AppError> {
        let counts = [
            ("adults", self.adults),
            ("children", self.children),
            ("infants", self.infants),
            ("extra_beds", self.extra_beds),
        ];
        for (field, count) in counts {
            if count > MAX_OCCUPANCY_COUNT {
                return Err(AppError::invalid(
                    field,
                    format!("{} must be at most {}", field, MAX_OCCUPANCY_COUNT),
                ));
            }
        }
        Ok(())
    }

    pub fn is_single_use(&self) -> bool {
        self.total_guests() == 1
    }
}

/// Priced stay, every amount already multiplied by nights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// `None` when no rule could be resolved and nothing was priced
    pub pricing_model: Option<PricingModel>,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub adult_supplement: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub child_supplement: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub infant_supplement: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub extra_bed_supplement: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub single_use_supplement: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub extra_occupancy_charge: Decimal,
    pub extra_persons: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_price: Decimal,
    pub currency: String,
    pub nights: u32,
    pub occupancy: Occupancy,
}

impl PriceBreakdown {
    /// Zero breakdown returned when no rule applies
    pub fn unavailable(occupancy: Occupancy, nights: u32, currency: &str) -> Self {
        Self {
            pricing_model: None,
            base_price: Decimal::ZERO,
            adult_supplement: Decimal::ZERO,
            child_supplement: Decimal::ZERO,
            infant_supplement: Decimal::ZERO,
            extra_bed_supplement: Decimal::ZERO,
            single_use_supplement: Decimal::ZERO,
            extra_occupancy_charge: Decimal::ZERO,
            extra_persons: 0,
            total_price: Decimal::ZERO,
            currency: currency.to_string(),
            nights,
            occupancy,
        }
    }

    pub fn is_priced(&self) -> bool {
        self.pricing_model.is_some()
    }

    /// Sum of all supplement and charge lines, excluding the base
    pub fn supplements_total(&self) -> Decimal {
        self.adult_supplement
            + self.child_supplement
            + self.infant_supplement
            + self.extra_bed_supplement
            + self.single_use_supplement
            + self.extra_occupancy_charge
    }
}

/// Price a stay with a resolved rule.
///
/// A missing rule yields [`PriceBreakdown::unavailable`]; callers must turn
/// that into an explicit error rather than charge nothing.
pub fn calculate_price(
    resolved: Option<&ResolvedRule>,
    occupancy: Occupancy,
    nights: u32,
    fallback_currency: &str,
) -> PriceBreakdown {
    match resolved {
        None => PriceBreakdown::unavailable(occupancy, nights, fallback_currency),
        Some(r) => match r.pricing_model {
            PricingModel::OccupancyBased => {
                price_occupancy_based(&r.rule, occupancy, nights, &r.currency)
            }
            PricingModel::UnitIncludedOccupancy => {
                price_unit_included_occupancy(&r.rule, occupancy, nights, &r.currency)
            }
        },
    }
}

/// Base price plus per-guest and per-extra-bed supplements.
///
/// The single use supplement applies only when exactly one guest
/// (of any age) occupies the room.
pub fn price_occupancy_based(
    rule: &RateRule,
    occupancy: Occupancy,
    nights: u32,
    currency: &str,
) -> PriceBreakdown {
    let n = Decimal::from(nights);

    let base = rule.base_price * n;
    let adult = Decimal::from(occupancy.adults) * rule.price_per_adult * n;
    let child = Decimal::from(occupancy.children) * rule.price_per_child * n;
    let infant = Decimal::from(occupancy.infants) * rule.price_per_infant * n;
    let extra_bed = Decimal::from(occupancy.extra_beds) * rule.price_per_extra_bed * n;
    let single_use = if occupancy.is_single_use() {
        rule.single_use_supplement * n
    } else {
        Decimal::ZERO
    };

    let total = round_money(base + adult + child + infant + extra_bed + single_use, 2);

    PriceBreakdown {
        pricing_model: Some(PricingModel::OccupancyBased),
        base_price: round_money(base, 2),
        adult_supplement: round_money(adult, 2),
        child_supplement: round_money(child, 2),
        infant_supplement: round_money(infant, 2),
        extra_bed_supplement: round_money(extra_bed, 2),
        single_use_supplement: round_money(single_use, 2),
        extra_occupancy_charge: Decimal::ZERO,
        extra_persons: 0,
        total_price: total,
        currency: currency.to_string(),
        nights,
        occupancy,
    }
}

/// Unit price covering the included guests, plus a charge per extra person.
///
/// Infants are not counted and extra beds are not persons here.
pub fn price_unit_included_occupancy(
    rule: &RateRule,
    occupancy: Occupancy,
    nights: u32,
    currency: &str,
) -> PriceBreakdown {
    let n = Decimal::from(nights);
    let included = rule
        .included_occupancy
        .unwrap_or(DEFAULT_INCLUDED_OCCUPANCY)
        .max(0) as u32;
    let extra_persons = occupancy.chargeable_guests().saturating_sub(included);

    let base = rule.base_price * n;
    let extra_charge = Decimal::from(extra_persons) * rule.price_per_extra_person * n;
    let total = round_money(base + extra_charge, 2);

    PriceBreakdown {
        pricing_model: Some(PricingModel::UnitIncludedOccupancy),
        base_price: round_money(base, 2),
        adult_supplement: Decimal::ZERO,
        child_supplement: Decimal::ZERO,
        infant_supplement: Decimal::ZERO,
        extra_bed_supplement: Decimal::ZERO,
        single_use_supplement: Decimal::ZERO,
        extra_occupancy_charge: round_money(extra_charge, 2),
        extra_persons,
        total_price: total,
        currency: currency.to_string(),
        nights,
        occupancy,
    }
}

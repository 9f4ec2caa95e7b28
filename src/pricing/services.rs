//! Pricing service functions with store access.
//!
//! These functions combine the store and cache lookups with the pure
//! calculators to resolve a rate rule and price a stay.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::allotments::checkout_date;
use crate::cache::AppCache;
use crate::error::{AppError, FieldIssue, Result};
use crate::store::InventoryStore;

use super::calculators::{calculate_price, Occupancy, PriceBreakdown};
use super::models::{RateRule, ResolvedRule, RuleScope};
use super::requests::{CreateRateRuleRequest, PriceQuery};

/// A priced stay together with the rule that produced it
#[derive(Debug, Clone, Serialize)]
pub struct PriceQuote {
    pub breakdown: PriceBreakdown,
    pub rate_rule: ResolvedRule,
}

/// Find the rule that prices a stay arriving on `date`.
///
/// Lookup walks the specificity tiers from stay+room down to the plan-wide
/// rule and stops at the first hit. An inactive plan resolves to nothing.
///
/// # Arguments
/// * `store` - Inventory store
/// * `cache` - Application cache (for the rate plan)
/// * `rate_plan_id` - Plan to price under
/// * `stay_type_id` - Optional stay type; tiers needing one are skipped without it
/// * `room_type_id` - Room type being sold
/// * `date` - Check-in date; the rule's range must contain it
///
/// # Returns
/// `None` when no rule applies. Only a missing plan is an error.
pub async fn resolve_rate_rule(
    store: &dyn InventoryStore,
    cache: &AppCache,
    rate_plan_id: Uuid,
    stay_type_id: Option<Uuid>,
    room_type_id: Uuid,
    date: NaiveDate,
) -> Result<Option<ResolvedRule>> {
    let plan = cache
        .rate_plan(store, rate_plan_id)
        .await?
        .ok_or_else(|| AppError::not_found("rate plan", rate_plan_id))?;

    if !plan.is_active {
        debug!(rate_plan_id = %rate_plan_id, "Rate plan inactive, no rule resolved");
        return Ok(None);
    }

    for scope in RuleScope::fallback_order(stay_type_id, room_type_id) {
        if let Some(rule) = store.find_rate_rule(plan.id, scope, date).await? {
            debug!(
                rate_plan_id = %rate_plan_id,
                rate_rule_id = %rule.id,
                scope = scope.label(),
                "Rate rule resolved"
            );
            return Ok(Some(ResolvedRule {
                rule,
                pricing_model: plan.pricing_model,
                currency: plan.currency.clone(),
                scope: scope.label(),
            }));
        }
    }

    debug!(
        rate_plan_id = %rate_plan_id,
        room_type_id = %room_type_id,
        date = %date,
        "No rate rule covers date"
    );
    Ok(None)
}

/// Price a stay, failing with not-found when no rule applies.
pub async fn resolve_price(
    store: &dyn InventoryStore,
    cache: &AppCache,
    query: &PriceQuery,
) -> Result<PriceQuote> {
    checkout_date(query.checkin_date, query.nights)?;
    query.occupancy.check_bounds()?;
    cache
        .room_type(store, query.room_type_id)
        .await?
        .ok_or_else(|| AppError::not_found("room type", query.room_type_id))?;
    if let Some(stay_type_id) = query.stay_type_id {
        cache
            .stay_type(store, stay_type_id)
            .await?
            .ok_or_else(|| AppError::not_found("stay type", stay_type_id))?;
    }

    let resolved = resolve_rate_rule(
        store,
        cache,
        query.rate_plan_id,
        query.stay_type_id,
        query.room_type_id,
        query.checkin_date,
    )
    .await?;

    let Some(resolved) = resolved else {
        return Err(AppError::NotFound {
            entity: "rate rule",
            id: format!(
                "plan {} room type {} on {}",
                query.rate_plan_id, query.room_type_id, query.checkin_date
            ),
        });
    };

    let breakdown = quote(&resolved, query.occupancy, query.nights);
    Ok(PriceQuote {
        breakdown,
        rate_rule: resolved,
    })
}

/// Price an already-resolved rule.
pub fn quote(resolved: &ResolvedRule, occupancy: Occupancy, nights: u32) -> PriceBreakdown {
    calculate_price(Some(resolved), occupancy, nights, &resolved.currency)
}

/// Validate and store a new rate rule.
///
/// A rule overlapping another one of the same plan at the same specificity
/// tier is rejected with a conflict.
pub async fn create_rate_rule(
    store: &dyn InventoryStore,
    request: CreateRateRuleRequest,
) -> Result<RateRule> {
    let rule = request.into_rule(Uuid::new_v4(), Utc::now());

    let problems = rule.validate();
    if !problems.is_empty() {
        warn!(rate_plan_id = %rule.rate_plan_id, ?problems, "Rejected invalid rate rule");
        return Err(AppError::Validation(
            problems
                .into_iter()
                .map(|message| FieldIssue::new("rate_rule", message))
                .collect(),
        ));
    }

    store.insert_rate_rule(&rule).await?;

    info!(
        rate_rule_id = %rule.id,
        rate_plan_id = %rule.rate_plan_id,
        scope = rule.scope().label(),
        start_date = %rule.start_date,
        end_date = %rule.end_date,
        "Rate rule created"
    );
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::{PricingModel, RatePlan};
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    fn plan(active: bool) -> RatePlan {
        RatePlan {
            id: Uuid::new_v4(),
            name: "Summer".to_string(),
            pricing_model: PricingModel::OccupancyBased,
            currency: "EUR".to_string(),
            is_active: active,
        }
    }

    fn rule(plan_id: Uuid, stay: Option<Uuid>, room: Option<Uuid>, base: Decimal) -> RateRule {
        RateRule {
            id: Uuid::new_v4(),
            rate_plan_id: plan_id,
            stay_type_id: stay,
            room_type_id: room,
            start_date: date(1),
            end_date: date(30),
            base_price: base,
            price_per_adult: dec!(0),
            price_per_child: dec!(0),
            price_per_infant: dec!(0),
            price_per_extra_bed: dec!(0),
            single_use_supplement: dec!(0),
            included_occupancy: None,
            price_per_extra_person: dec!(0),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_most_specific_rule_wins() {
        let store = MemoryStore::new();
        let cache = AppCache::default();
        let p = plan(true);
        let stay = Uuid::new_v4();
        let room = Uuid::new_v4();
        store.add_rate_plan(p.clone());
        store.add_rate_rule_unchecked(rule(p.id, None, None, dec!(50)));
        store.add_rate_rule_unchecked(rule(p.id, Some(stay), None, dec!(60)));
        store.add_rate_rule_unchecked(rule(p.id, None, Some(room), dec!(70)));
        store.add_rate_rule_unchecked(rule(p.id, Some(stay), Some(room), dec!(80)));

        let hit = resolve_rate_rule(&store, &cache, p.id, Some(stay), room, date(10))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.rule.base_price, dec!(80));
        assert_eq!(hit.scope, "stay_and_room");

        // Without a stay type the room tier is the best match
        let hit = resolve_rate_rule(&store, &cache, p.id, None, room, date(10))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.rule.base_price, dec!(70));

        // Other room: stay tier beats global
        let hit = resolve_rate_rule(&store, &cache, p.id, Some(stay), Uuid::new_v4(), date(10))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.rule.base_price, dec!(60));
    }

    #[tokio::test]
    async fn test_inactive_plan_resolves_nothing() {
        let store = MemoryStore::new();
        let cache = AppCache::default();
        let p = plan(false);
        store.add_rate_plan(p.clone());
        store.add_rate_rule_unchecked(rule(p.id, None, None, dec!(50)));

        let hit = resolve_rate_rule(&store, &cache, p.id, None, Uuid::new_v4(), date(10))
            .await
            .unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn test_date_outside_range_resolves_nothing() {
        let store = MemoryStore::new();
        let cache = AppCache::default();
        let p = plan(true);
        store.add_rate_plan(p.clone());
        store.add_rate_rule_unchecked(rule(p.id, None, None, dec!(50)));

        let july = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let hit = resolve_rate_rule(&store, &cache, p.id, None, Uuid::new_v4(), july)
            .await
            .unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn test_missing_plan_is_not_found() {
        let store = MemoryStore::new();
        let cache = AppCache::default();
        let err = resolve_rate_rule(&store, &cache, Uuid::new_v4(), None, Uuid::new_v4(), date(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "rate plan", .. }));
    }
}

//! Rate rule resolution and pricing through the store.

mod common;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{date, rule, Fixture};
use hotel_inventory_core::error::AppError;
use hotel_inventory_core::pricing::requests::{CreateRateRuleRequest, PriceQuery};
use hotel_inventory_core::pricing::{
    create_rate_rule, resolve_price, resolve_rate_rule, Occupancy, PricingModel, RatePlan,
};

fn query(f: &Fixture, occupancy: Occupancy, nights: u32) -> PriceQuery {
    PriceQuery {
        stay_type_id: Some(f.week.id),
        room_type_id: f.room.id,
        rate_plan_id: f.plan.id,
        checkin_date: date(2026, 7, 4),
        nights,
        occupancy,
    }
}

#[tokio::test]
async fn test_occupancy_based_week_for_family() {
    let f = Fixture::new();
    let quote = resolve_price(f.store.as_ref(), &f.cache, &query(&f, Occupancy::new(2, 1, 0, 0), 7))
        .await
        .unwrap();

    assert_eq!(quote.breakdown.total_price, dec!(1155.00));
    assert_eq!(quote.breakdown.currency, "EUR");
    assert_eq!(quote.breakdown.pricing_model, Some(PricingModel::OccupancyBased));
    assert_eq!(quote.rate_rule.rule.id, f.rule.id);
    assert_eq!(quote.rate_rule.scope, "room");
}

#[tokio::test]
async fn test_single_use_supplement_only_for_one_guest() {
    let f = Fixture::new();
    let single = resolve_price(f.store.as_ref(), &f.cache, &query(&f, Occupancy::new(1, 0, 0, 0), 4))
        .await
        .unwrap();
    // (100 + 25 + 30) * 4
    assert_eq!(single.breakdown.total_price, dec!(620.00));
    assert_eq!(single.breakdown.single_use_supplement, dec!(120));

    let couple = resolve_price(f.store.as_ref(), &f.cache, &query(&f, Occupancy::new(2, 0, 0, 0), 4))
        .await
        .unwrap();
    assert_eq!(couple.breakdown.single_use_supplement, dec!(0));
}

#[tokio::test]
async fn test_unit_included_occupancy_plan() {
    let f = Fixture::new();
    let plan = RatePlan {
        id: Uuid::new_v4(),
        name: "Apartment".to_string(),
        pricing_model: PricingModel::UnitIncludedOccupancy,
        currency: "EUR".to_string(),
        is_active: true,
    };
    let mut unit = rule(plan.id, None, None, date(2026, 1, 1), date(2026, 12, 31));
    unit.base_price = dec!(500);
    unit.included_occupancy = Some(2);
    unit.price_per_extra_person = dec!(50);
    f.store.add_rate_plan(plan.clone());
    f.store.add_rate_rule_unchecked(unit);

    let mut q = query(&f, Occupancy::new(2, 1, 0, 0), 7);
    q.rate_plan_id = plan.id;
    let quote = resolve_price(f.store.as_ref(), &f.cache, &q).await.unwrap();

    assert_eq!(quote.breakdown.total_price, dec!(3850.00));
    assert_eq!(quote.breakdown.extra_occupancy_charge, dec!(350.00));
    assert_eq!(quote.rate_rule.scope, "global");
}

#[tokio::test]
async fn test_no_rule_is_not_found() {
    let f = Fixture::new();
    let mut q = query(&f, Occupancy::new(2, 0, 0, 0), 7);
    q.checkin_date = date(2027, 3, 1);

    let err = resolve_price(f.store.as_ref(), &f.cache, &q).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound { entity: "rate rule", .. }));
}

#[tokio::test]
async fn test_huge_counts_and_stays_are_rejected_before_pricing() {
    let f = Fixture::new();

    let crowd = query(&f, Occupancy::new(u32::MAX, 1, 0, 0), 7);
    let err = resolve_price(f.store.as_ref(), &f.cache, &crowd)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let forever = query(&f, Occupancy::new(2, 0, 0, 0), u32::MAX);
    let err = resolve_price(f.store.as_ref(), &f.cache, &forever)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_stay_specific_rule_beats_room_rule() {
    let f = Fixture::new();
    let mut special = rule(
        f.plan.id,
        Some(f.week.id),
        Some(f.room.id),
        date(2026, 7, 1),
        date(2026, 7, 31),
    );
    special.base_price = dec!(80);
    f.store.add_rate_rule_unchecked(special.clone());

    let hit = resolve_rate_rule(
        f.store.as_ref(),
        &f.cache,
        f.plan.id,
        Some(f.week.id),
        f.room.id,
        date(2026, 7, 10),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(hit.rule.id, special.id);

    // Outside July only the room rule covers the date
    let hit = resolve_rate_rule(
        f.store.as_ref(),
        &f.cache,
        f.plan.id,
        Some(f.week.id),
        f.room.id,
        date(2026, 8, 10),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(hit.rule.id, f.rule.id);
}

#[tokio::test]
async fn test_duplicate_tier_resolves_to_newest_rule() {
    let f = Fixture::new();
    let mut newer = rule(f.plan.id, None, Some(f.room.id), date(2026, 7, 1), date(2026, 7, 31));
    newer.base_price = dec!(90);
    newer.created_at = Utc::now() + Duration::seconds(5);
    f.store.add_rate_rule_unchecked(newer.clone());

    let hit = resolve_rate_rule(f.store.as_ref(), &f.cache, f.plan.id, None, f.room.id, date(2026, 7, 5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.rule.id, newer.id);
}

fn rule_request(f: &Fixture, start: (u32, u32), end: (u32, u32)) -> CreateRateRuleRequest {
    CreateRateRuleRequest {
        rate_plan_id: f.plan.id,
        stay_type_id: Some(f.week.id),
        room_type_id: None,
        start_date: date(2026, start.0, start.1),
        end_date: date(2026, end.0, end.1),
        base_price: dec!(120),
        price_per_adult: dec!(20),
        price_per_child: dec!(10),
        price_per_infant: dec!(0),
        price_per_extra_bed: dec!(0),
        single_use_supplement: dec!(0),
        included_occupancy: None,
        price_per_extra_person: dec!(0),
    }
}

#[tokio::test]
async fn test_create_rate_rule_rejects_overlap_at_same_tier() {
    let f = Fixture::new();
    create_rate_rule(f.store.as_ref(), rule_request(&f, (6, 1), (6, 30)))
        .await
        .unwrap();

    let err = create_rate_rule(f.store.as_ref(), rule_request(&f, (6, 30), (7, 15)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Adjacent range is fine
    create_rate_rule(f.store.as_ref(), rule_request(&f, (7, 1), (7, 15)))
        .await
        .unwrap();

    // Same dates at another tier are fine: the fixture's room rule overlaps
    let mut global = rule_request(&f, (6, 1), (6, 30));
    global.stay_type_id = None;
    create_rate_rule(f.store.as_ref(), global).await.unwrap();
}

#[tokio::test]
async fn test_create_rate_rule_validates_amounts() {
    let f = Fixture::new();
    let mut request = rule_request(&f, (6, 30), (6, 1));
    request.price_per_adult = dec!(-5);

    let err = create_rate_rule(f.store.as_ref(), request).await.unwrap_err();
    match err {
        AppError::Validation(issues) => assert_eq!(issues.len(), 2),
        other => panic!("expected validation error, got {:?}", other),
    }
}

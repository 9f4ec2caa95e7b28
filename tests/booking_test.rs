//! Booking validation, creation, cancellation and lifecycle.

mod common;

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use common::{at_noon, date, guest, Fixture};
use hotel_inventory_core::bookings::{
    cancel_booking, create_booking, restore_for_booking, transition_booking,
    validate_booking_request, BookingStatus, CancellationPolicy,
};
use hotel_inventory_core::error::AppError;
use hotel_inventory_core::store::InventoryStore;

fn open_july(f: &Fixture, quantity: i32) {
    f.open(date(2026, 7, 1), 8, quantity);
}

#[tokio::test]
async fn test_create_reduces_every_night() {
    let f = Fixture::new();
    open_july(&f, 2);
    let today = date(2026, 6, 1);

    let booking = create_booking(
        f.store.as_ref(),
        &f.cache,
        &f.request(date(2026, 7, 1)),
        today,
        at_noon(today),
    )
    .await
    .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.total_price, dec!(1155.00));
    assert_eq!(booking.currency, "EUR");
    assert_eq!(booking.check_out_date, date(2026, 7, 8));
    for day in 1..=7 {
        assert_eq!(f.allocated(date(2026, 7, day)), 1);
    }
    // Checkout night is not consumed
    assert_eq!(f.allocated(date(2026, 7, 8)), 0);

    let stored = f.store.booking(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.total_price, booking.total_price);
}

#[tokio::test]
async fn test_booking_snapshots_price_rule_and_guests() {
    let f = Fixture::new();
    open_july(&f, 2);
    let today = date(2026, 6, 1);

    let booking = create_booking(
        f.store.as_ref(),
        &f.cache,
        &f.request(date(2026, 7, 1)),
        today,
        at_noon(today),
    )
    .await
    .unwrap();

    let snapshot_total: Decimal = booking.price_breakdown["total_price"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(snapshot_total, dec!(1155));
    assert_eq!(booking.price_breakdown["nights"], 7);
    assert_eq!(booking.rate_rule["rule"]["id"], f.rule.id.to_string());

    let guests = booking.guests.as_array().unwrap();
    assert_eq!(guests.len(), 3);
    assert_eq!(guests[0]["name"], "Marta");
    assert_eq!(guests[0]["category"], "adult");
    assert_eq!(guests[2]["category"], "child");
    assert_eq!(guests[2]["age_at_checkin"], 7);
}

#[tokio::test]
async fn test_declared_category_is_overridden_by_age() {
    let f = Fixture::new();
    open_july(&f, 2);
    let today = date(2026, 6, 1);
    let mut request = f.request(date(2026, 7, 1));
    // Turns 13 before check-in but was declared as a child
    request.guests[2] = guest("Noa", "2013-06-15", "child");

    let validation = validate_booking_request(f.store.as_ref(), &f.cache, &request, today)
        .await
        .unwrap();
    assert!(validation.is_valid);
    assert!(validation
        .warnings
        .iter()
        .any(|w| w.field == "guests[2].guest_category"));

    let booking = create_booking(f.store.as_ref(), &f.cache, &request, today, at_noon(today))
        .await
        .unwrap();
    assert_eq!(booking.guests[2]["category"], "adult");
}

#[tokio::test]
async fn test_validation_accumulates_errors() {
    let f = Fixture::new();
    open_july(&f, 2);
    let today = date(2026, 7, 10);
    let mut request = f.request(date(2026, 7, 1));
    request.adults = 0;
    request.children = 4;
    request.extra_beds = 2;
    request.guests[0].birthdate = None;

    let validation = validate_booking_request(f.store.as_ref(), &f.cache, &request, today)
        .await
        .unwrap();

    assert!(!validation.is_valid);
    let fields: Vec<&str> = validation.errors.iter().map(|e| e.field.as_str()).collect();
    assert!(fields.contains(&"adults"));
    assert!(fields.contains(&"occupancy"));
    assert!(fields.contains(&"extra_beds"));
    assert!(fields.contains(&"check_in_date"));
    assert!(fields.contains(&"guests[0].birthdate"));
    assert!(validation
        .errors
        .iter()
        .any(|e| e.message == "check-in date is in the past"));
}

#[tokio::test]
async fn test_sold_out_night_blocks_booking() {
    let f = Fixture::new();
    open_july(&f, 1);
    let mut full = f.store.allotment(f.room.id, date(2026, 7, 4)).unwrap();
    full.allocated = 1;
    f.store.add_allotment(full);
    let today = date(2026, 6, 1);

    let err = create_booking(
        f.store.as_ref(),
        &f.cache,
        &f.request(date(2026, 7, 1)),
        today,
        at_noon(today),
    )
    .await
    .unwrap_err();

    let errors = match err {
        AppError::Validation(errors) => errors,
        other => panic!("expected validation error, got {:?}", other),
    };
    assert!(errors
        .iter()
        .any(|e| e.field == "check_in_date" && e.message == "no rooms available on 2026-07-04"));
    assert_eq!(f.allocated(date(2026, 7, 1)), 0);
}

#[tokio::test]
async fn test_wrong_length_and_unknown_plan_are_reported() {
    let f = Fixture::new();
    open_july(&f, 2);
    let mut request = f.request(date(2026, 7, 1));
    request.nights = 5;
    request.rate_plan_id = uuid::Uuid::new_v4();

    let validation =
        validate_booking_request(f.store.as_ref(), &f.cache, &request, date(2026, 6, 1))
            .await
            .unwrap();

    let fields: Vec<&str> = validation.errors.iter().map(|e| e.field.as_str()).collect();
    assert!(fields.contains(&"nights"));
    assert!(fields.contains(&"total_price"));
    assert_eq!(fields.last(), Some(&"rate_plan_id"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_for_last_room() {
    let f = Fixture::new();
    open_july(&f, 1);
    let store: Arc<dyn InventoryStore> = f.store.clone();
    let today = date(2026, 6, 1);

    let tasks: Vec<_> = (0..12)
        .map(|_| {
            let store = store.clone();
            let cache = f.cache.clone();
            let request = f.request(date(2026, 7, 1));
            tokio::spawn(async move {
                create_booking(store.as_ref(), &cache, &request, today, at_noon(today)).await
            })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    for day in 1..=7 {
        assert_eq!(f.allocated(date(2026, 7, day)), 1);
    }
}

async fn booked(f: &Fixture) -> uuid::Uuid {
    open_july(f, 2);
    let today = date(2026, 6, 1);
    create_booking(
        f.store.as_ref(),
        &f.cache,
        &f.request(date(2026, 7, 1)),
        today,
        at_noon(today),
    )
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn test_cancel_refunds_by_notice_and_restores() {
    let policy = CancellationPolicy::default();
    let cases = [
        (date(2026, 6, 24), dec!(1039.50)),
        (date(2026, 6, 30), dec!(577.50)),
        (date(2026, 6, 11), dec!(1155.00)),
        (date(2026, 6, 28), dec!(808.50)),
    ];

    for (today, refund) in cases {
        let f = Fixture::new();
        let id = booked(&f).await;

        let outcome = cancel_booking(f.store.as_ref(), &policy, id, at_noon(today))
            .await
            .unwrap();

        assert_eq!(outcome.status, BookingStatus::Cancelled);
        assert_eq!(outcome.refund_amount, refund, "cancelled on {}", today);
        assert_eq!(outcome.total_restored, 7);
        assert_eq!(f.allocated(date(2026, 7, 1)), 0);

        let stored = f.store.booking(id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
        assert_eq!(stored.refund_amount, Some(refund));
        assert!(stored.cancelled_at.is_some());
    }
}

#[tokio::test]
async fn test_cancel_twice_conflicts() {
    let f = Fixture::new();
    let id = booked(&f).await;
    let policy = CancellationPolicy::default();
    let now = at_noon(date(2026, 6, 20));

    cancel_booking(f.store.as_ref(), &policy, id, now).await.unwrap();
    let err = cancel_booking(f.store.as_ref(), &policy, id, now)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(f.allocated(date(2026, 7, 1)), 0);
}

#[tokio::test]
async fn test_cancel_on_checkin_day_conflicts() {
    let f = Fixture::new();
    let id = booked(&f).await;

    let err = cancel_booking(
        f.store.as_ref(),
        &CancellationPolicy::default(),
        id,
        at_noon(date(2026, 7, 1)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(f.allocated(date(2026, 7, 1)), 1);
}

#[tokio::test]
async fn test_cancel_unknown_booking_is_not_found() {
    let f = Fixture::new();
    let err = cancel_booking(
        f.store.as_ref(),
        &CancellationPolicy::default(),
        uuid::Uuid::new_v4(),
        at_noon(date(2026, 6, 1)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[tokio::test]
async fn test_lifecycle_moves_forward_only() {
    let f = Fixture::new();
    let id = booked(&f).await;
    let store = f.store.as_ref();

    let confirmed = transition_booking(store, id, BookingStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let err = transition_booking(store, id, BookingStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = transition_booking(store, id, BookingStatus::Cancelled)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    transition_booking(store, id, BookingStatus::CheckedIn)
        .await
        .unwrap();
    let done = transition_booking(store, id, BookingStatus::CheckedOut)
        .await
        .unwrap();
    assert_eq!(done.status, BookingStatus::CheckedOut);

    // A checked-in or later booking cannot be cancelled
    let err = cancel_booking(
        store,
        &CancellationPolicy::default(),
        id,
        at_noon(date(2026, 6, 20)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_restore_of_live_booking_conflicts_and_keeps_room_sold() {
    let f = Fixture::new();
    open_july(&f, 1);
    let today = date(2026, 6, 1);
    let first = create_booking(
        f.store.as_ref(),
        &f.cache,
        &f.request(date(2026, 7, 1)),
        today,
        at_noon(today),
    )
    .await
    .unwrap();

    let err = restore_for_booking(f.store.as_ref(), first.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(f.allocated(date(2026, 7, 1)), 1);

    let second = create_booking(
        f.store.as_ref(),
        &f.cache,
        &f.request(date(2026, 7, 1)),
        today,
        at_noon(today),
    )
    .await;
    assert!(second.is_err());
    assert_eq!(f.allocated(date(2026, 7, 1)), 1);
}

#[tokio::test]
async fn test_restore_after_cancel_is_idempotent() {
    let f = Fixture::new();
    let cancelled = booked(&f).await;
    let today = date(2026, 6, 1);
    cancel_booking(
        f.store.as_ref(),
        &CancellationPolicy::default(),
        cancelled,
        at_noon(today),
    )
    .await
    .unwrap();

    // Another guest takes one of the two units back
    create_booking(
        f.store.as_ref(),
        &f.cache,
        &f.request(date(2026, 7, 1)),
        today,
        at_noon(today),
    )
    .await
    .unwrap();

    for _ in 0..2 {
        let released = restore_for_booking(f.store.as_ref(), cancelled)
            .await
            .unwrap();
        assert_eq!(released.total_changed, 0);
        assert_eq!(released.dates_affected.len(), 7);
    }
    for day in 1..=7 {
        assert_eq!(f.allocated(date(2026, 7, day)), 1);
    }
}

#[tokio::test]
async fn test_huge_party_is_reported_not_panicking() {
    let f = Fixture::new();
    open_july(&f, 2);
    let mut request = f.request(date(2026, 7, 1));
    request.adults = u32::MAX;
    request.children = 1;

    let validation =
        validate_booking_request(f.store.as_ref(), &f.cache, &request, date(2026, 6, 1))
            .await
            .unwrap();

    assert!(!validation.is_valid);
    assert!(validation.errors.iter().any(|e| e.field == "occupancy"));
    assert!(validation.errors.iter().any(|e| e.field == "total_price"));
}

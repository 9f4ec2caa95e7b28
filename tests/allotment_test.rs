//! Allotment reduce/restore semantics, including concurrent reduces.

mod common;

use std::sync::Arc;

use uuid::Uuid;

use common::{date, Fixture};
use hotel_inventory_core::allotments::{
    reduce_allotment, restore_allotment, AllotmentError, MAX_STAY_NIGHTS,
};
use hotel_inventory_core::error::AppError;
use hotel_inventory_core::store::{InventoryStore, MemoryStore};

#[tokio::test]
async fn test_reduce_takes_one_unit_per_night() {
    let f = Fixture::new();
    f.open(date(2026, 5, 1), 5, 3);

    let result = reduce_allotment(f.store.as_ref(), f.room.id, date(2026, 5, 1), 3)
        .await
        .unwrap();

    assert_eq!(result.total_changed, 3);
    assert_eq!(
        result.dates_affected,
        vec![date(2026, 5, 1), date(2026, 5, 2), date(2026, 5, 3)]
    );
    assert_eq!(f.allocated(date(2026, 5, 1)), 1);
    assert_eq!(f.allocated(date(2026, 5, 3)), 1);
    assert_eq!(f.allocated(date(2026, 5, 4)), 0);
}

#[tokio::test]
async fn test_failure_on_any_date_rolls_back_all() {
    let f = Fixture::new();
    f.open(date(2026, 5, 1), 5, 2);
    let mut blocked = f.store.allotment(f.room.id, date(2026, 5, 4)).unwrap();
    blocked.stop_sell = true;
    f.store.add_allotment(blocked);

    let err = reduce_allotment(f.store.as_ref(), f.room.id, date(2026, 5, 1), 5)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Allotment(AllotmentError::StopSell { date: d }) if d == date(2026, 5, 4)
    ));
    for day in 1..=5 {
        assert_eq!(f.allocated(date(2026, 5, day)), 0);
    }
}

#[tokio::test]
async fn test_missing_date_fails_reduce() {
    let f = Fixture::new();
    f.open(date(2026, 5, 1), 2, 2);

    let err = reduce_allotment(f.store.as_ref(), f.room.id, date(2026, 5, 1), 3)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Allotment(AllotmentError::NotFound { .. })
    ));
    assert_eq!(f.allocated(date(2026, 5, 1)), 0);
}

#[tokio::test]
async fn test_restore_never_goes_below_zero() {
    let f = Fixture::new();
    f.open(date(2026, 5, 1), 2, 2);

    let result = restore_allotment(f.store.as_ref(), f.room.id, date(2026, 5, 1), date(2026, 5, 3))
        .await
        .unwrap();

    assert_eq!(result.dates_affected.len(), 2);
    assert_eq!(result.total_changed, 0);
    assert_eq!(f.allocated(date(2026, 5, 1)), 0);
}

#[tokio::test]
async fn test_restore_of_missing_row_is_integrity_fault() {
    let f = Fixture::new();
    f.open(date(2026, 5, 1), 3, 2);
    reduce_allotment(f.store.as_ref(), f.room.id, date(2026, 5, 1), 3)
        .await
        .unwrap();
    f.store.remove_allotment(f.room.id, date(2026, 5, 2));

    let err = restore_allotment(f.store.as_ref(), f.room.id, date(2026, 5, 1), date(2026, 5, 4))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Integrity(_)));
    // Nothing restored on the surviving rows either
    assert_eq!(f.allocated(date(2026, 5, 1)), 1);
    assert_eq!(f.allocated(date(2026, 5, 3)), 1);
}

#[tokio::test]
async fn test_reduce_rejects_zero_nights() {
    let store = MemoryStore::new();
    let err = reduce_allotment(&store, Uuid::new_v4(), date(2026, 5, 1), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_reduce_rejects_stays_past_calendar_or_limit() {
    let f = Fixture::new();
    let last = chrono::NaiveDate::MAX.pred_opt().unwrap();

    let err = reduce_allotment(f.store.as_ref(), f.room.id, last, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = reduce_allotment(f.store.as_ref(), f.room.id, date(2026, 5, 1), u32::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    f.open(date(2026, 5, 1), 2, 2);
    let err = reduce_allotment(
        f.store.as_ref(),
        f.room.id,
        date(2026, 5, 1),
        MAX_STAY_NIGHTS + 1,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(f.allocated(date(2026, 5, 1)), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reduces_sell_last_room_once() {
    let f = Fixture::new();
    f.open(date(2026, 8, 1), 3, 1);
    let store: Arc<dyn InventoryStore> = f.store.clone();
    let room = f.room.id;

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                reduce_allotment(store.as_ref(), room, date(2026, 8, 1), 3).await
            })
        })
        .collect();

    let mut successes = 0;
    let mut sold_out = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::Allotment(AllotmentError::NoRoomsAvailable { .. })) => sold_out += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(sold_out, 31);
    for day in 1..=3 {
        assert_eq!(f.allocated(date(2026, 8, day)), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reduce_and_restore_stay_in_bounds() {
    let f = Fixture::new();
    f.open(date(2026, 8, 1), 2, 5);
    let store: Arc<dyn InventoryStore> = f.store.clone();
    let room = f.room.id;

    let tasks: Vec<_> = (0..40)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    reduce_allotment(store.as_ref(), room, date(2026, 8, 1), 2)
                        .await
                        .map(|_| ())
                } else {
                    restore_allotment(store.as_ref(), room, date(2026, 8, 1), date(2026, 8, 3))
                        .await
                        .map(|_| ())
                }
            })
        })
        .collect();

    for task in tasks {
        let _ = task.await.unwrap();
    }

    for day in 1..=2 {
        let allocated = f.allocated(date(2026, 8, day));
        assert!((0..=5).contains(&allocated), "allocated {} out of bounds", allocated);
    }
    // Both nights always move together
    assert_eq!(f.allocated(date(2026, 8, 1)), f.allocated(date(2026, 8, 2)));
}

//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use hotel_inventory_core::allotments::Allotment;
use hotel_inventory_core::bookings::{BookingRequest, GuestInput};
use hotel_inventory_core::cache::AppCache;
use hotel_inventory_core::guests::HotelAgePolicy;
use hotel_inventory_core::models::{BoardType, RoomType, StayType};
use hotel_inventory_core::pricing::{PricingModel, RatePlan, RateRule};
use hotel_inventory_core::store::MemoryStore;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at_noon(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

/// One hotel with a double room, a seven night package and an
/// occupancy-based plan priced at 100 + 25/adult + 15/child per night.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub cache: AppCache,
    pub hotel_id: Uuid,
    pub room: RoomType,
    pub week: StayType,
    pub plan: RatePlan,
    pub rule: RateRule,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let hotel_id = Uuid::new_v4();

        let room = RoomType {
            id: Uuid::new_v4(),
            hotel_id: Some(hotel_id),
            name: "Double Sea View".to_string(),
            base_occupancy: 2,
            max_occupancy: 3,
            extra_bed_slots: 1,
            single_use_supplement: dec!(30),
        };
        let week = StayType {
            id: Uuid::new_v4(),
            name: "Seven nights half board".to_string(),
            nights: 7,
            included_board_type: BoardType::HalfBoard,
        };
        let plan = RatePlan {
            id: Uuid::new_v4(),
            name: "Best available".to_string(),
            pricing_model: PricingModel::OccupancyBased,
            currency: "EUR".to_string(),
            is_active: true,
        };
        let rule = rule(plan.id, None, Some(room.id), date(2026, 1, 1), date(2026, 12, 31));

        store.add_room_type(room.clone());
        store.add_stay_type(week.clone());
        store.add_rate_plan(plan.clone());
        store.add_age_policy(
            hotel_id,
            HotelAgePolicy {
                hotel_id: Some(hotel_id),
                infant_max_age: Some(2),
                child_max_age: Some(12),
                adult_min_age: 18,
            },
        );
        store.add_rate_rule_unchecked(rule.clone());

        Self {
            store,
            cache: AppCache::default(),
            hotel_id,
            room,
            week,
            plan,
            rule,
        }
    }

    /// Open `days` consecutive dates from `from` with `quantity` units each
    pub fn open(&self, from: NaiveDate, days: u64, quantity: i32) {
        for offset in 0..days {
            let day = from.checked_add_days(Days::new(offset)).unwrap();
            self.store
                .add_allotment(Allotment::new(self.room.id, day, quantity));
        }
    }

    pub fn allocated(&self, day: NaiveDate) -> i32 {
        self.store.allotment(self.room.id, day).unwrap().allocated
    }

    /// Two adults and a child for the week package
    pub fn request(&self, check_in: NaiveDate) -> BookingRequest {
        BookingRequest {
            room_type_id: self.room.id,
            stay_type_id: self.week.id,
            rate_plan_id: self.plan.id,
            check_in_date: check_in,
            nights: 7,
            adults: 2,
            children: 1,
            infants: 0,
            extra_beds: 0,
            guests: vec![
                guest("Marta", "1985-03-14", "adult"),
                guest("Jon", "1983-11-02", "adult"),
                guest("Lia", "2018-08-20", "child"),
            ],
        }
    }
}

pub fn guest(name: &str, birthdate: &str, category: &str) -> GuestInput {
    GuestInput {
        name: name.to_string(),
        birthdate: Some(birthdate.to_string()),
        guest_category: Some(category.to_string()),
    }
}

pub fn rule(
    rate_plan_id: Uuid,
    stay_type_id: Option<Uuid>,
    room_type_id: Option<Uuid>,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> RateRule {
    RateRule {
        id: Uuid::new_v4(),
        rate_plan_id,
        stay_type_id,
        room_type_id,
        start_date,
        end_date,
        base_price: dec!(100),
        price_per_adult: dec!(25),
        price_per_child: dec!(15),
        price_per_infant: dec!(0),
        price_per_extra_bed: dec!(20),
        single_use_supplement: dec!(30),
        included_occupancy: None,
        price_per_extra_person: dec!(0),
        created_at: Utc::now(),
    }
}

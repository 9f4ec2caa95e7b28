//! In-memory caching using moka
//!
//! Caches read-mostly reference data: rate plans, room types, stay types and
//! hotel age policies. Allotments and rate rules are never cached because
//! they change with every booking or price edit.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::guests::HotelAgePolicy;
use crate::models::{RoomType, StayType};
use crate::pricing::models::RatePlan;
use crate::store::InventoryStore;

/// Application cache holding catalogue lookups
#[derive(Clone)]
pub struct AppCache {
    /// Rate plans (id -> RatePlan)
    pub rate_plans: Cache<Uuid, Arc<RatePlan>>,
    /// Room types (id -> RoomType)
    pub room_types: Cache<Uuid, Arc<RoomType>>,
    /// Stay types (id -> StayType)
    pub stay_types: Cache<Uuid, Arc<StayType>>,
    /// Age policies (hotel id -> HotelAgePolicy)
    pub age_policies: Cache<Uuid, Arc<HotelAgePolicy>>,
}

impl AppCache {
    /// Create a new cache instance with the given TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            rate_plans: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .build(),
            room_types: Cache::builder()
                .max_capacity(5_000)
                .time_to_live(ttl)
                .build(),
            stay_types: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .build(),
            age_policies: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            rate_plans_size: self.rate_plans.entry_count(),
            room_types_size: self.room_types.entry_count(),
            stay_types_size: self.stay_types.entry_count(),
            age_policies_size: self.age_policies.entry_count(),
        }
    }

    pub async fn rate_plan(
        &self,
        store: &dyn InventoryStore,
        id: Uuid,
    ) -> Result<Option<Arc<RatePlan>>> {
        if let Some(cached) = self.rate_plans.get(&id).await {
            debug!("Cache HIT for rate plan: {}", id);
            return Ok(Some(cached));
        }
        debug!("Cache MISS for rate plan: {}", id);
        let Some(plan) = store.rate_plan(id).await? else {
            return Ok(None);
        };
        let plan = Arc::new(plan);
        self.rate_plans.insert(id, plan.clone()).await;
        Ok(Some(plan))
    }

    pub async fn room_type(
        &self,
        store: &dyn InventoryStore,
        id: Uuid,
    ) -> Result<Option<Arc<RoomType>>> {
        if let Some(cached) = self.room_types.get(&id).await {
            return Ok(Some(cached));
        }
        let Some(room_type) = store.room_type(id).await? else {
            return Ok(None);
        };
        let room_type = Arc::new(room_type);
        self.room_types.insert(id, room_type.clone()).await;
        Ok(Some(room_type))
    }

    pub async fn stay_type(
        &self,
        store: &dyn InventoryStore,
        id: Uuid,
    ) -> Result<Option<Arc<StayType>>> {
        if let Some(cached) = self.stay_types.get(&id).await {
            return Ok(Some(cached));
        }
        let Some(stay_type) = store.stay_type(id).await? else {
            return Ok(None);
        };
        let stay_type = Arc::new(stay_type);
        self.stay_types.insert(id, stay_type.clone()).await;
        Ok(Some(stay_type))
    }

    /// Age policy for a room type's hotel, or the default bands for
    /// standalone houses and hotels without a policy row.
    pub async fn age_policy(
        &self,
        store: &dyn InventoryStore,
        hotel_id: Option<Uuid>,
    ) -> Result<Arc<HotelAgePolicy>> {
        let Some(hotel_id) = hotel_id else {
            return Ok(Arc::new(HotelAgePolicy::default()));
        };
        if let Some(cached) = self.age_policies.get(&hotel_id).await {
            return Ok(cached);
        }
        let policy = Arc::new(store.age_policy(hotel_id).await?.unwrap_or_else(|| {
            HotelAgePolicy {
                hotel_id: Some(hotel_id),
                ..HotelAgePolicy::default()
            }
        }));
        self.age_policies.insert(hotel_id, policy.clone()).await;
        Ok(policy)
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub rate_plans_size: u64,
    pub room_types_size: u64,
    pub stay_types_size: u64,
    pub age_policies_size: u64,
}

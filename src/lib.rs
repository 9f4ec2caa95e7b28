//! Pricing, availability and allotment engine for hotel reservations.
//!
//! Callers hand in a stay (room type, stay type, rate plan, check-in date,
//! nights, occupancy) and get back a price breakdown, an availability result
//! with per-date diagnostics, or an allotment mutation committed together
//! with the booking row.

use std::sync::Arc;

pub mod allotments;
pub mod availability;
pub mod bookings;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod guests;
pub mod models;
pub mod pricing;
pub mod routes;
pub mod store;

use cache::AppCache;
use config::Config;
use store::InventoryStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InventoryStore>,
    pub cache: AppCache,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn InventoryStore>, config: Config) -> Self {
        Self {
            store,
            cache: AppCache::new(config.cache_ttl),
            config: Arc::new(config),
        }
    }
}

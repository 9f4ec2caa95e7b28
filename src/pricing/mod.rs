//! Pricing engine module.
//!
//! Resolves the rate rule that applies to a stay and prices it under the
//! plan's pricing model.

pub mod calculators;
pub mod models;
pub mod queries;
pub mod requests;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{calculate_price, round_money, Occupancy, PriceBreakdown};
pub use models::{PricingModel, RatePlan, RateRule, ResolvedRule, RuleScope};
pub use routes::router;
pub use services::{create_rate_rule, quote, resolve_price, resolve_rate_rule, PriceQuote};

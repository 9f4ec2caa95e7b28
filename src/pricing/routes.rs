//! Pricing API handlers

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::error::Result;
use crate::AppState;

use super::models::RateRule;
use super::requests::{CreateRateRuleRequest, PriceQuery};
use super::services::{self, PriceQuote};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pricing/quote", post(quote))
        .route("/pricing/rate-rules", post(create_rate_rule))
}

/// Price a stay under a rate plan
async fn quote(
    State(state): State<AppState>,
    Json(query): Json<PriceQuery>,
) -> Result<Json<PriceQuote>> {
    let quote = services::resolve_price(state.store.as_ref(), &state.cache, &query).await?;
    Ok(Json(quote))
}

async fn create_rate_rule(
    State(state): State<AppState>,
    Json(request): Json<CreateRateRuleRequest>,
) -> Result<(StatusCode, Json<RateRule>)> {
    let rule = services::create_rate_rule(state.store.as_ref(), request).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

//! Availability API handlers

use axum::{extract::State, routing::post, Json, Router};

use crate::error::Result;
use crate::AppState;

use super::checker;
use super::models::{AvailabilityQuery, AvailabilityResult};

pub fn router() -> Router<AppState> {
    Router::new().route("/availability/check", post(check))
}

async fn check(
    State(state): State<AppState>,
    Json(query): Json<AvailabilityQuery>,
) -> Result<Json<AvailabilityResult>> {
    let result = checker::check_availability(state.store.as_ref(), &state.cache, &query).await?;
    Ok(Json(result))
}

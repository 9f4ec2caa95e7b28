//! Guest classification API handlers

use axum::{extract::State, routing::post, Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::AppState;

use super::classifier::{age_on, category_for_age, parse_birthdate, ClassificationError};
use super::models::GuestCategory;

pub fn router() -> Router<AppState> {
    Router::new().route("/guests/classify", post(classify))
}

/// Request to classify one guest. The hotel's age policy applies when
/// `hotel_id` is given, the default bands otherwise.
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub checkin_date: Option<NaiveDate>,
    #[serde(default)]
    pub hotel_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub category: GuestCategory,
    pub age_at_checkin: u32,
}

async fn classify(
    State(state): State<AppState>,
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>> {
    let raw = request
        .birthdate
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ClassificationError::MissingBirthdate)?;
    let checkin = request
        .checkin_date
        .ok_or(ClassificationError::MissingCheckinDate)?;
    let age = age_on(parse_birthdate(raw)?, checkin)?;

    let policy = state
        .cache
        .age_policy(state.store.as_ref(), request.hotel_id)
        .await?;

    Ok(Json(ClassifyResponse {
        category: category_for_age(age, &policy),
        age_at_checkin: age,
    }))
}

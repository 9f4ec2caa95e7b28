//! Booking API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::AppState;

use super::models::Booking;
use super::requests::{BookingRequest, StatusChangeRequest};
use super::services::{self, CancellationOutcome};
use super::validation::ValidationResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create))
        .route("/bookings/validate", post(validate))
        .route("/bookings/:id", get(show))
        .route("/bookings/:id/cancel", post(cancel))
        .route("/bookings/:id/status", post(change_status))
}

async fn validate(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<ValidationResult>> {
    let today = Utc::now().date_naive();
    let result =
        services::validate_booking_request(state.store.as_ref(), &state.cache, &request, today)
            .await?;
    Ok(Json(result))
}

async fn create(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Booking>)> {
    let now = Utc::now();
    let booking = services::create_booking(
        state.store.as_ref(),
        &state.cache,
        &request,
        now.date_naive(),
        now,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Booking>> {
    let booking = state
        .store
        .booking(id)
        .await?
        .ok_or_else(|| AppError::not_found("booking", id))?;
    Ok(Json(booking))
}

async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancellationOutcome>> {
    let outcome = services::cancel_booking(
        state.store.as_ref(),
        &state.config.cancellation_policy,
        id,
        Utc::now(),
    )
    .await?;
    Ok(Json(outcome))
}

async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<Booking>> {
    let booking = services::transition_booking(state.store.as_ref(), id, request.status).await?;
    Ok(Json(booking))
}

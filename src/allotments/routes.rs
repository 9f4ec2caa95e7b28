//! Allotment API handlers

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::bookings::restore_for_booking;
use crate::error::{AppError, Result};
use crate::AppState;

use super::models::{Allotment, AllotmentMutation};
use super::mutator::reduce_allotment;
use super::requests::{AllotmentRangeQuery, ReduceRequest, RestoreRequest, SetAllotmentRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/allotments", get(list).put(set))
        .route("/allotments/reduce", post(reduce))
        .route("/allotments/restore", post(restore))
}

#[derive(Debug, Serialize)]
pub struct ReduceResponse {
    pub room_type_id: Uuid,
    pub dates_affected: Vec<NaiveDate>,
    pub total_reduced: u32,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub room_type_id: Uuid,
    pub dates_affected: Vec<NaiveDate>,
    pub total_restored: u32,
}

async fn reduce(
    State(state): State<AppState>,
    Json(request): Json<ReduceRequest>,
) -> Result<Json<ReduceResponse>> {
    let AllotmentMutation {
        room_type_id,
        dates_affected,
        total_changed,
    } = reduce_allotment(
        state.store.as_ref(),
        request.room_type_id,
        request.checkin_date,
        request.nights,
    )
    .await?;
    Ok(Json(ReduceResponse {
        room_type_id,
        dates_affected,
        total_reduced: total_changed,
    }))
}

async fn restore(
    State(state): State<AppState>,
    Json(request): Json<RestoreRequest>,
) -> Result<Json<RestoreResponse>> {
    let AllotmentMutation {
        room_type_id,
        dates_affected,
        total_changed,
    } = restore_for_booking(state.store.as_ref(), request.booking_id).await?;
    Ok(Json(RestoreResponse {
        room_type_id,
        dates_affected,
        total_restored: total_changed,
    }))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<AllotmentRangeQuery>,
) -> Result<Json<Vec<Allotment>>> {
    if query.until < query.from {
        return Err(AppError::invalid("until", "until must not be before from"));
    }
    let rows = state
        .store
        .allotments(query.room_type_id, query.from, query.until)
        .await?;
    Ok(Json(rows))
}

async fn set(
    State(state): State<AppState>,
    Json(request): Json<SetAllotmentRequest>,
) -> Result<Json<Allotment>> {
    let issues = request.validate();
    if !issues.is_empty() {
        return Err(AppError::Validation(issues));
    }
    let (room_type_id, date) = (request.room_type_id, request.date);
    state
        .cache
        .room_type(state.store.as_ref(), room_type_id)
        .await?
        .ok_or_else(|| AppError::not_found("room type", room_type_id))?;

    state.store.upsert_allotment(&request.into_allotment()).await?;
    info!(room_type_id = %room_type_id, date = %date, "Allotment set");

    let stored = state
        .store
        .allotments(room_type_id, date, date)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal(format!("allotment for {} vanished after upsert", date)))?;
    Ok(Json(stored))
}

//! Allotment reduce/restore.
//!
//! Row-level checks live here so every store applies the same rules while
//! holding its own lock on the row. Stores must visit dates in ascending
//! order inside a single transaction and roll back on the first error.

use chrono::{Days, NaiveDate};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::store::InventoryStore;

use super::models::{Allotment, AllotmentMutation};

/// Per-date failure while mutating allotments
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllotmentError {
    #[error("allotment not found for {date}")]
    NotFound { date: NaiveDate },

    #[error("stop sell active on {date}")]
    StopSell { date: NaiveDate },

    #[error("no rooms available on {date}")]
    NoRoomsAvailable { date: NaiveDate },
}

/// Direction of an allotment mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllotmentOp {
    /// Take one unit per date for a new booking
    Reduce,
    /// Give one unit back per date for a cancelled booking
    Restore,
}

impl AllotmentOp {
    /// New `allocated` value for a row already locked by the caller.
    pub fn apply(
        &self,
        date: NaiveDate,
        row: Option<&Allotment>,
    ) -> std::result::Result<i32, AllotmentError> {
        let row = row.ok_or(AllotmentError::NotFound { date })?;
        match self {
            AllotmentOp::Reduce => {
                if row.stop_sell {
                    return Err(AllotmentError::StopSell { date });
                }
                if row.remaining() <= 0 {
                    return Err(AllotmentError::NoRoomsAvailable { date });
                }
                Ok(row.allocated + 1)
            }
            // Clamped so a double restore cannot go negative
            AllotmentOp::Restore => Ok((row.allocated - 1).max(0)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AllotmentOp::Reduce => "reduce",
            AllotmentOp::Restore => "restore",
        }
    }
}

/// Longest stay accepted anywhere a night count comes from a caller
pub const MAX_STAY_NIGHTS: u32 = 366;

/// Check-out date of a stay, rejecting empty, overlong or out-of-calendar stays.
pub fn checkout_date(checkin: NaiveDate, nights: u32) -> Result<NaiveDate> {
    if nights == 0 {
        return Err(AppError::invalid("nights", "nights must be positive"));
    }
    if nights > MAX_STAY_NIGHTS {
        return Err(AppError::invalid(
            "nights",
            format!("nights must be at most {}", MAX_STAY_NIGHTS),
        ));
    }
    checkin
        .checked_add_days(Days::new(u64::from(nights)))
        .ok_or_else(|| AppError::invalid("nights", "stay runs past the supported calendar"))
}

/// Nights of a stay: up to `nights` consecutive dates starting at check-in.
pub fn stay_dates(checkin: NaiveDate, nights: u32) -> Vec<NaiveDate> {
    checkin.iter_days().take(nights as usize).collect()
}

/// Dates in `[from, until)`, ascending.
pub fn date_range(from: NaiveDate, until: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|d| *d < until).collect()
}

/// Take one unit on each night of a stay, all or nothing.
pub async fn reduce_allotment(
    store: &dyn InventoryStore,
    room_type_id: Uuid,
    checkin: NaiveDate,
    nights: u32,
) -> Result<AllotmentMutation> {
    let checkout = checkout_date(checkin, nights)?;
    let dates = date_range(checkin, checkout);
    let result = store
        .mutate_allotments(room_type_id, &dates, AllotmentOp::Reduce)
        .await?;

    info!(
        room_type_id = %room_type_id,
        checkin = %checkin,
        nights,
        total_reduced = result.total_changed,
        "Allotment reduced"
    );
    Ok(result)
}

/// Give back one unit on each date in `[checkin, checkout)`.
///
/// A missing row here means a reduce happened without a matching allotment,
/// so it is reported as an integrity fault rather than skipped.
pub async fn restore_allotment(
    store: &dyn InventoryStore,
    room_type_id: Uuid,
    checkin: NaiveDate,
    checkout: NaiveDate,
) -> Result<AllotmentMutation> {
    if checkout <= checkin {
        return Err(AppError::invalid(
            "check_out_date",
            "check-out must be after check-in",
        ));
    }

    let dates = date_range(checkin, checkout);
    let result = store
        .mutate_allotments(room_type_id, &dates, AllotmentOp::Restore)
        .await
        .map_err(|e| restore_fault(room_type_id, e))?;

    info!(
        room_type_id = %room_type_id,
        checkin = %checkin,
        checkout = %checkout,
        total_restored = result.total_changed,
        "Allotment restored"
    );
    Ok(result)
}

/// Escalate a missing row during restore to an integrity fault.
pub fn restore_fault(room_type_id: Uuid, err: AppError) -> AppError {
    match err {
        AppError::Allotment(AllotmentError::NotFound { date }) => {
            error!(
                room_type_id = %room_type_id,
                date = %date,
                "Allotment row missing during restore"
            );
            AppError::Integrity(format!(
                "allotment not found for room type {} on {}",
                room_type_id, date
            ))
        }
        other => other,
    }
}

//! Status transitions and the cancellation refund policy.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::pricing::round_money;

use super::models::{Booking, BookingStatus};

/// One row of a refund table: cancelling at least `threshold_days` before
/// check-in refunds `refund_fraction` of the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundTier {
    pub threshold_days: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub refund_fraction: Decimal,
}

/// Ordered refund table, kept as data so each hotel can vary it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationPolicy {
    tiers: Vec<RefundTier>,
}

impl CancellationPolicy {
    /// Build a policy from tiers in any order.
    pub fn new(mut tiers: Vec<RefundTier>) -> std::result::Result<Self, String> {
        for tier in &tiers {
            if tier.refund_fraction < Decimal::ZERO || tier.refund_fraction > Decimal::ONE {
                return Err(format!(
                    "refund fraction {} for {} days is outside 0..=1",
                    tier.refund_fraction, tier.threshold_days
                ));
            }
            if tier.threshold_days < 0 {
                return Err(format!("negative threshold {}", tier.threshold_days));
            }
        }
        tiers.sort_by_key(|t| t.threshold_days);
        tiers.dedup_by_key(|t| t.threshold_days);
        Ok(Self { tiers })
    }

    /// Parse `"days:fraction,days:fraction"`, e.g. `"0:0,1:0.5,14:1"`.
    pub fn parse(table: &str) -> std::result::Result<Self, String> {
        let tiers = table
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|pair| {
                let (days, fraction) = pair
                    .split_once(':')
                    .ok_or_else(|| format!("expected days:fraction, got '{}'", pair))?;
                Ok(RefundTier {
                    threshold_days: days
                        .trim()
                        .parse()
                        .map_err(|_| format!("invalid day threshold '{}'", days))?,
                    refund_fraction: fraction
                        .trim()
                        .parse()
                        .map_err(|_| format!("invalid refund fraction '{}'", fraction))?,
                })
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;
        Self::new(tiers)
    }

    pub fn tiers(&self) -> &[RefundTier] {
        &self.tiers
    }

    /// Fraction for the greatest threshold not above `days_until_checkin`.
    pub fn refund_fraction(&self, days_until_checkin: i64) -> Decimal {
        self.tiers
            .iter()
            .rev()
            .find(|t| t.threshold_days <= days_until_checkin)
            .map(|t| t.refund_fraction)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn refund_amount(&self, total_price: Decimal, days_until_checkin: i64) -> Decimal {
        round_money(total_price * self.refund_fraction(days_until_checkin), 2)
    }
}

impl Default for CancellationPolicy {
    /// 0 days → 0%, 1 → 50%, 3 → 70%, 7 → 90%, 14+ → 100%
    fn default() -> Self {
        let tier = |threshold_days, refund_fraction| RefundTier {
            threshold_days,
            refund_fraction,
        };
        Self {
            tiers: vec![
                tier(0, Decimal::ZERO),
                tier(1, Decimal::new(5, 1)),
                tier(3, Decimal::new(7, 1)),
                tier(7, Decimal::new(9, 1)),
                tier(14, Decimal::ONE),
            ],
        }
    }
}

pub fn days_until_checkin(booking: &Booking, today: NaiveDate) -> i64 {
    (booking.check_in_date - today).num_days()
}

/// Reject a cancellation the booking's status or dates do not permit.
pub fn ensure_cancellable(booking: &Booking, today: NaiveDate) -> Result<()> {
    if !booking.status.can_transition_to(BookingStatus::Cancelled) {
        return Err(AppError::Conflict(format!(
            "booking {} is {} and cannot be cancelled",
            booking.id, booking.status
        )));
    }
    if today >= booking.check_in_date {
        return Err(AppError::Conflict(format!(
            "booking {} cannot be cancelled on or after its check-in date {}",
            booking.id, booking.check_in_date
        )));
    }
    Ok(())
}

/// Reject any status change outside the linear lifecycle.
pub fn ensure_transition(booking: &Booking, next: BookingStatus) -> Result<()> {
    if booking.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "booking {} cannot move from {} to {}",
            booking.id, booking.status, next
        )))
    }
}

//! Age-based guest classification.
//!
//! Pure functions - no database access. Ages are always taken at the
//! check-in date, never at booking time.

use chrono::{Datelike, NaiveDate};

use super::models::{GuestCategory, HotelAgePolicy};

/// Oldest plausible guest age in whole years
pub const MAX_GUEST_AGE: u32 = 150;

/// Reasons a classification input is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("birthdate is required")]
    MissingBirthdate,

    #[error("check-in date is required")]
    MissingCheckinDate,

    #[error("birthdate '{0}' is not a valid YYYY-MM-DD date")]
    UnparsableBirthdate(String),

    #[error("birthdate {birthdate} is after check-in date {checkin}")]
    BirthdateAfterCheckin {
        birthdate: NaiveDate,
        checkin: NaiveDate,
    },

    #[error("age of {0} years exceeds the maximum of {MAX_GUEST_AGE}")]
    AgeOutOfRange(u32),
}

/// Whole calendar years elapsed between `birthdate` and `on`.
///
/// A birthday not yet reached in the year of `on` does not count.
pub fn age_on(birthdate: NaiveDate, on: NaiveDate) -> Result<u32, ClassificationError> {
    if birthdate > on {
        return Err(ClassificationError::BirthdateAfterCheckin {
            birthdate,
            checkin: on,
        });
    }

    let mut years = on.year() - birthdate.year();
    if (on.month(), on.day()) < (birthdate.month(), birthdate.day()) {
        years -= 1;
    }

    let years = years.max(0) as u32;
    if years > MAX_GUEST_AGE {
        return Err(ClassificationError::AgeOutOfRange(years));
    }
    Ok(years)
}

/// Map an age onto the policy's exclusive upper bounds.
pub fn category_for_age(age: u32, policy: &HotelAgePolicy) -> GuestCategory {
    let age = age as i64;
    if let Some(infant_max) = policy.infant_max_age {
        if age < infant_max as i64 {
            return GuestCategory::Infant;
        }
    }
    if age < policy.effective_child_max_age() as i64 {
        GuestCategory::Child
    } else {
        GuestCategory::Adult
    }
}

/// Classify a guest from an ISO birthdate string as of check-in.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use hotel_inventory_core::guests::{classify_guest, GuestCategory, HotelAgePolicy};
///
/// let checkin = NaiveDate::from_ymd_opt(2026, 7, 1);
/// let category = classify_guest(Some("2020-06-30"), checkin, &HotelAgePolicy::default());
/// assert_eq!(category, Ok(GuestCategory::Child));
/// ```
pub fn classify_guest(
    birthdate: Option<&str>,
    checkin: Option<NaiveDate>,
    policy: &HotelAgePolicy,
) -> Result<GuestCategory, ClassificationError> {
    let raw = birthdate
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ClassificationError::MissingBirthdate)?;
    let checkin = checkin.ok_or(ClassificationError::MissingCheckinDate)?;
    let birthdate = parse_birthdate(raw)?;

    classify(birthdate, checkin, policy)
}

/// Classify a guest with an already-parsed birthdate.
pub fn classify(
    birthdate: NaiveDate,
    checkin: NaiveDate,
    policy: &HotelAgePolicy,
) -> Result<GuestCategory, ClassificationError> {
    let age = age_on(birthdate, checkin)?;
    Ok(category_for_age(age, policy))
}

pub fn parse_birthdate(raw: &str) -> Result<NaiveDate, ClassificationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ClassificationError::UnparsableBirthdate(raw.to_string()))
}

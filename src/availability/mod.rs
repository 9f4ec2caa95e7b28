//! Availability checks across allotments, restrictions and rates.

pub mod checker;
pub mod models;
pub mod routes;

pub use checker::{assess_stay, check_availability, diagnose_date, StayAssessment};
pub use models::{
    AvailabilityIssue, AvailabilityQuery, AvailabilityResult, DateDiagnostic, StayRestrictions,
    UnavailableReason,
};
pub use routes::router;

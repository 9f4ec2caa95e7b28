//! Booking validation, creation and cancellation.

pub mod lifecycle;
pub mod models;
pub mod queries;
pub mod requests;
pub mod routes;
pub mod services;
pub mod validation;

pub use lifecycle::{
    days_until_checkin, ensure_cancellable, ensure_transition, CancellationPolicy, RefundTier,
};
pub use models::{Booking, BookingStatus, Cancellation, GuestSnapshot};
pub use requests::{BookingRequest, GuestInput, StatusChangeRequest};
pub use routes::router;
pub use services::{
    cancel_booking, create_booking, restore_for_booking, transition_booking,
    validate_booking_request, CancellationOutcome,
};
pub use validation::{validate_booking, ValidationContext, ValidationResult};

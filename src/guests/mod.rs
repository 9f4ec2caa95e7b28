//! Guest age classification.

pub mod classifier;
pub mod models;
pub mod routes;

pub use classifier::{
    age_on, category_for_age, classify, classify_guest, parse_birthdate, ClassificationError,
};
pub use models::{GuestCategory, HotelAgePolicy, UnknownCategory};
pub use routes::router;

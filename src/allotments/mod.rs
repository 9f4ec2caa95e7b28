//! Allotment inventory and its transactional mutation.

pub mod models;
pub mod mutator;
pub mod queries;
pub mod requests;
pub mod routes;

pub use models::{Allotment, AllotmentMutation};
pub use mutator::{
    checkout_date, date_range, reduce_allotment, restore_allotment, stay_dates, AllotmentError,
    AllotmentOp, MAX_STAY_NIGHTS,
};
pub use routes::router;

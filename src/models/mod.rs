//! Shared catalogue models referenced by every engine component.

pub mod property;

pub use property::{BoardType, RoomType, StayType};

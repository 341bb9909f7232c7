//! Core record domain types.

pub mod actor;
pub mod clock;
pub mod error;
pub mod id;
pub mod model;

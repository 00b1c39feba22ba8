//! Content domain model.

pub mod catalog;
pub mod step;

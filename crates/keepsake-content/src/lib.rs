//! Keepsake Content Authoring context.
//!
//! Responsible for describing a card as data: the step catalog, each step's
//! lines and actions, and the rules that make a catalog a valid narrative
//! path (one optional choice point, a restart edge from every ending).

pub mod application;
pub mod domain;
pub mod error;

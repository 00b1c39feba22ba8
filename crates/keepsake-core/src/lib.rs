//! Keepsake Core: shared domain abstractions.
//!
//! This crate defines the traits and types the narrative and content
//! contexts agree on: time, events, aggregates, commands and the
//! celebration collaborator. It contains no runtime or I/O code.

pub mod aggregate;
pub mod celebration;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;

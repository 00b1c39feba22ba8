//! Keepsake terminal player.
//!
//! Hosts one card session in a terminal: types each line out, shows the
//! buttons once a step is fully revealed, and takes actions from stdin or
//! plays the card unattended.

pub mod autoplay;
pub mod config;
pub mod error;
pub mod runtime;
pub mod terminal;

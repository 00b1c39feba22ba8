//! Keepsake Narrative Sequencing bounded context.
//!
//! Responsible for step progression, the ordered reveal of each step's
//! lines, gating the action buttons behind those reveals, the accept/defer
//! branch, restarts, and suppressing reveal timers that outlive their step.

pub mod application;
pub mod domain;

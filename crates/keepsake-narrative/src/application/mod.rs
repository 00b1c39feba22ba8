//! Application services: the director that wires the sequencer to its
//! collaborators, the reveal contract and its typewriter implementation,
//! and the read model hosts render from.

pub mod command_handlers;
pub mod query_handlers;
pub mod revealer;
pub mod typewriter;

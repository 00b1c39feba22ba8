//! Domain error types.

use thiserror::Error;

/// Rejected narrative requests.
///
/// Every variant means the request was refused before any state changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The requested step does not exist in the card's catalog.
    #[error("unknown step: {0}")]
    UnknownStep(String),

    /// The requested edge is not part of the card's path graph.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// The step the session is on.
        from: String,
        /// The step that was requested.
        to: String,
    },

    /// The step's action buttons have not been revealed yet.
    #[error("actions of step {0} are not revealed yet")]
    ActionsNotRevealed(String),

    /// A choice operation was requested on a step that offers no choice.
    #[error("step {0} does not offer a choice")]
    NotAtChoice(String),

    /// A continue operation was requested on a step with no single forward edge.
    #[error("step {0} has no forward edge")]
    NoForwardEdge(String),
}

//! Content loading and validation errors.

use thiserror::Error;

use crate::domain::step::{StepId, SubElement};

/// Reasons a card could not be loaded or is not a valid narrative.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The card file could not be read.
    #[error("failed to read card: {0}")]
    Io(#[from] std::io::Error),

    /// The card file is not valid YAML for a card.
    #[error("failed to parse card: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// No built-in card has this name.
    #[error("unknown built-in card: {0}")]
    UnknownBuiltin(String),

    /// The card defines no steps.
    #[error("card has no steps")]
    EmptyCatalog,

    /// Two steps share an identifier.
    #[error("duplicate step: {0}")]
    DuplicateStep(StepId),

    /// The initial step is not defined.
    #[error("initial step {0} is not defined")]
    UnknownInitial(StepId),

    /// An action points at a step that is not defined.
    #[error("step {from} points at undefined step {to}")]
    DanglingEdge {
        /// The step holding the action.
        from: StepId,
        /// The missing target.
        to: StepId,
    },

    /// A line has no visible text.
    #[error("step {step} has an empty {element} line")]
    EmptyLine {
        /// The offending step.
        step: StepId,
        /// The empty line.
        element: SubElement,
    },

    /// Both choice buttons lead to the same step.
    #[error("choice step {0} must fork into two different steps")]
    DegenerateChoice(StepId),

    /// More than one step offers a choice.
    #[error("only one choice step is allowed, found {first} and {second}")]
    MultipleChoices {
        /// The first choice step found.
        first: StepId,
        /// The second choice step found.
        second: StepId,
    },

    /// A step is entered from more than one place.
    #[error("step {0} is entered from more than one step")]
    MergedPath(StepId),

    /// Forward edges loop back to an earlier step.
    #[error("forward edges loop back into step {0}")]
    Cycle(StepId),

    /// A step cannot be reached from the initial step.
    #[error("step {0} is unreachable from the initial step")]
    Unreachable(StepId),
}

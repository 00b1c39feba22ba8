//! Domain events for the Narrative Sequencing context.

use keepsake_content::domain::step::{StepId, SubElement};
use keepsake_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};

use super::reveal::RevealCue;

/// Why a step was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryTrigger {
    /// The session was mounted on its initial step.
    Mount,
    /// The single forward button was pressed.
    Continue,
    /// The accepting branch was taken.
    Accept,
    /// The "not yet" branch was taken.
    Defer,
    /// A choice edge was taken without pressing either button.
    Advance,
    /// The start-over control was used.
    Restart,
}

/// Emitted when a step becomes the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEntered {
    /// The step entered.
    pub step: StepId,
    /// The step left, `None` on mount.
    pub from: Option<StepId>,
    /// What caused the entry.
    pub trigger: EntryTrigger,
}

/// Emitted when a line has been fully typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubRevealCompleted {
    /// The step the line belongs to.
    pub step: StepId,
    /// The line completed.
    pub element: SubElement,
}

/// Emitted when a step's buttons become visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsRevealed {
    /// The step whose buttons are now visible.
    pub step: StepId,
}

/// Emitted when the accept branch, or a celebrating ending, asks for the celebration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CelebrationRequested {
    /// The choice step accepted on, or the ending that was typed out.
    pub step: StepId,
}

/// Event payload variants for the Narrative Sequencing context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrativeEventKind {
    /// A step has been entered.
    StepEntered(StepEntered),
    /// A line has been cued for reveal.
    RevealCued(RevealCue),
    /// A line has been fully revealed.
    SubRevealCompleted(SubRevealCompleted),
    /// A step's buttons have become visible.
    ActionsRevealed(ActionsRevealed),
    /// The celebration has been requested.
    CelebrationRequested(CelebrationRequested),
}

impl NarrativeEventKind {
    pub(crate) fn event_type(&self) -> &'static str {
        match self {
            Self::StepEntered(_) => "narrative.step_entered",
            Self::RevealCued(_) => "narrative.reveal_cued",
            Self::SubRevealCompleted(_) => "narrative.sub_reveal_completed",
            Self::ActionsRevealed(_) => "narrative.actions_revealed",
            Self::CelebrationRequested(_) => "narrative.celebration_requested",
        }
    }
}

/// Domain event envelope for the Narrative Sequencing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: NarrativeEventKind,
}

impl DomainEvent for NarrativeEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("NarrativeEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}

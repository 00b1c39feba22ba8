//! Query handlers for the Narrative Sequencing context.
//!
//! Hosts render from a `SessionView` rather than reading the sequencer's
//! internals: it lists only what the visitor may see right now.

use keepsake_content::domain::step::{Mood, StepActions, StepId, SubElement};
use keepsake_core::aggregate::AggregateRoot;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::NarrativeSequencer;
use crate::domain::reveal::{RevealFlags, RevealState};

/// A line that has been cued or fully revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleLine {
    /// Which element of the step.
    pub element: SubElement,
    /// The full text of the line.
    pub text: String,
    /// `Revealing` while being typed, `Complete` afterwards.
    pub state: RevealState,
}

/// Buttons on offer once a step has been fully revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionsView {
    /// One button to the next step.
    Continue {
        /// Button label.
        label: String,
    },
    /// Accept and defer buttons.
    Choice {
        /// Accepting button label.
        accept: String,
        /// "Not yet" button label.
        defer: String,
    },
    /// Start-over control.
    Restart {
        /// Control label.
        label: String,
    },
}

impl From<&StepActions> for ActionsView {
    fn from(actions: &StepActions) -> Self {
        match actions {
            StepActions::Continue { label, .. } => Self::Continue {
                label: label.clone(),
            },
            StepActions::Choice { accept, defer } => Self::Choice {
                accept: accept.label.clone(),
                defer: defer.label.clone(),
            },
            StepActions::Restart { label, .. } => Self::Restart {
                label: label.clone(),
            },
        }
    }
}

/// Read-only view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// The session identifier.
    pub session_id: Uuid,
    /// Name of the card being played.
    pub card: String,
    /// The step on screen.
    pub step: StepId,
    /// Mood for the decoration layer.
    pub mood: Mood,
    /// Step-entry generation.
    pub generation: u64,
    /// Current version (event count).
    pub version: i64,
    /// Lines cued so far, in reveal order.
    pub lines: Vec<VisibleLine>,
    /// Completion flags.
    pub flags: RevealFlags,
    /// The buttons, once visible.
    pub actions: Option<ActionsView>,
}

/// Builds the view of `sequencer`'s current state.
#[must_use]
pub fn session_view(sequencer: &NarrativeSequencer) -> SessionView {
    let content = sequencer.content();
    let progress = sequencer.progress();

    let lines = content
        .elements()
        .filter_map(|element| {
            let state = progress.state(element)?;
            let line = content.line(element)?;
            (state != RevealState::Hidden).then(|| VisibleLine {
                element,
                text: line.text.clone(),
                state,
            })
        })
        .collect();

    SessionView {
        session_id: sequencer.aggregate_id(),
        card: sequencer.catalog().name().to_owned(),
        step: sequencer.current_step().clone(),
        mood: content.mood,
        generation: sequencer.generation(),
        version: sequencer.version(),
        lines,
        flags: sequencer.flags(),
        actions: progress
            .actions_visible()
            .then(|| ActionsView::from(&content.actions)),
    }
}

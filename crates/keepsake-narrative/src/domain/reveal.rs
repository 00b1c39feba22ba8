//! Reveal progress within a single step.

use std::time::Duration;

use keepsake_content::domain::step::{StepContent, StepId, SubElement};
use serde::{Deserialize, Serialize};

/// Visibility of one textual element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealState {
    /// Not cued yet.
    #[default]
    Hidden,
    /// Cued: waiting for its start offset or being typed out.
    Revealing,
    /// Fully typed out.
    Complete,
}

/// Identifies one cued reveal: which element, under which step entry.
///
/// The revealer hands the ticket back on completion. A ticket issued before
/// the current step was entered carries an older generation and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevealTicket {
    /// Step-entry generation the reveal was cued under.
    pub generation: u64,
    /// The element being revealed.
    pub element: SubElement,
}

/// Instruction to type out one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealCue {
    /// Ticket to send back once the line is fully rendered.
    pub ticket: RevealTicket,
    /// Step the line belongs to.
    pub step: StepId,
    /// The text to type out.
    pub text: String,
    /// Pause before each character, in milliseconds.
    pub speed_ms: u64,
    /// Wait before typing the first character, in milliseconds.
    pub start_delay_ms: u64,
}

impl RevealCue {
    /// Pause before each character.
    #[must_use]
    pub fn speed(&self) -> Duration {
        Duration::from_millis(self.speed_ms)
    }

    /// Wait before typing the first character.
    #[must_use]
    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.start_delay_ms)
    }
}

/// What happened to a completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SignalOutcome {
    /// The element was marked complete.
    Applied,
    /// The ticket belongs to a step entry that has since been left.
    Stale,
    /// The element was already complete.
    Duplicate,
    /// The element has not been cued yet.
    OutOfOrder,
    /// The current step has no such element.
    UnknownElement,
}

/// Completion flags, one per sub-element, for hosts to render from.
///
/// Elements the step does not define read as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealFlags {
    /// Headline fully typed.
    pub headline: bool,
    /// Subtext fully typed.
    pub subtext: bool,
    /// Secondary line fully typed.
    pub line2: bool,
    /// Action buttons visible.
    pub actions: bool,
}

/// Per-step reveal state.
///
/// Monotonic within a step entry: `Hidden → Revealing → Complete` per
/// element, and the actions only become visible once every defined element
/// is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealProgress {
    headline: RevealState,
    subtext: Option<RevealState>,
    line2: Option<RevealState>,
    actions_visible: bool,
}

impl RevealProgress {
    /// Minimal state on entering `content`'s step: headline revealing,
    /// everything else hidden.
    #[must_use]
    pub fn entering(content: &StepContent) -> Self {
        Self {
            headline: RevealState::Revealing,
            subtext: content.subtext.as_ref().map(|_| RevealState::Hidden),
            line2: content.line2.as_ref().map(|_| RevealState::Hidden),
            actions_visible: false,
        }
    }

    /// State of `element`, or `None` if the step does not define it.
    #[must_use]
    pub fn state(&self, element: SubElement) -> Option<RevealState> {
        match element {
            SubElement::Headline => Some(self.headline),
            SubElement::Subtext => self.subtext,
            SubElement::Line2 => self.line2,
        }
    }

    /// True once `element` has been fully typed.
    #[must_use]
    pub fn is_complete(&self, element: SubElement) -> bool {
        self.state(element) == Some(RevealState::Complete)
    }

    /// True once every defined element has been fully typed.
    #[must_use]
    pub fn text_complete(&self) -> bool {
        SubElement::ALL
            .into_iter()
            .all(|element| matches!(self.state(element), None | Some(RevealState::Complete)))
    }

    /// True once the action buttons may be shown.
    #[must_use]
    pub fn actions_visible(&self) -> bool {
        self.actions_visible
    }

    /// The element currently being revealed, if any.
    #[must_use]
    pub fn revealing(&self) -> Option<SubElement> {
        SubElement::ALL
            .into_iter()
            .find(|element| self.state(*element) == Some(RevealState::Revealing))
    }

    /// Completion flags.
    #[must_use]
    pub fn flags(&self) -> RevealFlags {
        RevealFlags {
            headline: self.is_complete(SubElement::Headline),
            subtext: self.is_complete(SubElement::Subtext),
            line2: self.is_complete(SubElement::Line2),
            actions: self.actions_visible,
        }
    }

    fn slot_mut(&mut self, element: SubElement) -> Option<&mut RevealState> {
        match element {
            SubElement::Headline => Some(&mut self.headline),
            SubElement::Subtext => self.subtext.as_mut(),
            SubElement::Line2 => self.line2.as_mut(),
        }
    }

    pub(crate) fn begin(&mut self, element: SubElement) {
        if let Some(slot) = self
            .slot_mut(element)
            .filter(|slot| **slot == RevealState::Hidden)
        {
            *slot = RevealState::Revealing;
        }
    }

    pub(crate) fn complete(&mut self, element: SubElement) {
        if let Some(slot) = self
            .slot_mut(element)
            .filter(|slot| **slot == RevealState::Revealing)
        {
            *slot = RevealState::Complete;
        }
    }

    pub(crate) fn reveal_actions(&mut self) {
        if self.text_complete() {
            self.actions_visible = true;
        }
    }
}

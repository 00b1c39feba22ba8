//! Steps and their static content.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identifier of one screen in a card's narrative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Creates a step identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A textual sub-element of a step, in reveal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubElement {
    /// The step's main line; always present.
    Headline,
    /// Optional line revealed after the headline.
    Subtext,
    /// Optional secondary line revealed last.
    Line2,
}

impl SubElement {
    /// All textual elements in reveal order.
    pub const ALL: [Self; 3] = [Self::Headline, Self::Subtext, Self::Line2];

    /// Returns the snake-case name used in cards and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Headline => "headline",
            Self::Subtext => "subtext",
            Self::Line2 => "line2",
        }
    }
}

impl fmt::Display for SubElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_speed_ms() -> u64 {
    50
}

/// One line of text and its typing pace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealLine {
    /// The text to type out.
    pub text: String,
    /// Pause before each character, in milliseconds.
    #[serde(default = "default_speed_ms")]
    pub speed_ms: u64,
    /// Earliest start, in milliseconds after the step was entered.
    #[serde(default)]
    pub delay_ms: u64,
}

impl RevealLine {
    /// Creates a line with the default pace and no start delay.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speed_ms: default_speed_ms(),
            delay_ms: 0,
        }
    }

    /// Pause before each character.
    #[must_use]
    pub fn speed(&self) -> Duration {
        Duration::from_millis(self.speed_ms)
    }

    /// Earliest start relative to step entry.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Mascot mood the decoration layer shows while a step is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Default mood.
    #[default]
    Curious,
    Watching,
    Nervous,
    Sad,
    Hopeful,
    Excited,
    Joyful,
}

/// One button of a choice step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Button label.
    pub label: String,
    /// Step entered when the button is pressed.
    pub next: StepId,
}

/// What the visitor can do once a step has been fully revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepActions {
    /// A single button leading to the next step.
    Continue {
        /// Button label.
        label: String,
        /// The next step.
        next: StepId,
    },
    /// The branch point: accept (celebrated) or defer.
    Choice {
        /// The accepting button.
        accept: ChoiceOption,
        /// The "not yet" button.
        defer: ChoiceOption,
    },
    /// An ending; the only way on is back to the first step.
    Restart {
        /// Label of the start-over control.
        label: String,
        /// Celebrate once this ending has been fully revealed.
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        celebrate: bool,
    },
}

impl StepActions {
    /// Forward edges leaving a step with these actions.
    #[must_use]
    pub fn forward_edges(&self) -> Vec<&StepId> {
        match self {
            Self::Continue { next, .. } => vec![next],
            Self::Choice { accept, defer } => vec![&accept.next, &defer.next],
            Self::Restart { .. } => Vec::new(),
        }
    }

    /// Button labels in display order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Self::Continue { label, .. } | Self::Restart { label, .. } => vec![label.as_str()],
            Self::Choice { accept, defer } => vec![accept.label.as_str(), defer.label.as_str()],
        }
    }
}

/// Static content of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepContent {
    /// Step identifier.
    pub id: StepId,
    /// Mascot mood for this step.
    #[serde(default)]
    pub mood: Mood,
    /// Main line.
    pub headline: RevealLine,
    /// Line revealed after the headline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtext: Option<RevealLine>,
    /// Secondary line revealed last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<RevealLine>,
    /// Buttons shown once every line has been revealed.
    pub actions: StepActions,
}

impl StepContent {
    /// Returns the line for `element`, if the step defines one.
    #[must_use]
    pub fn line(&self, element: SubElement) -> Option<&RevealLine> {
        match element {
            SubElement::Headline => Some(&self.headline),
            SubElement::Subtext => self.subtext.as_ref(),
            SubElement::Line2 => self.line2.as_ref(),
        }
    }

    /// Textual elements this step defines, in reveal order.
    pub fn elements(&self) -> impl Iterator<Item = SubElement> + '_ {
        SubElement::ALL
            .into_iter()
            .filter(|element| self.line(*element).is_some())
    }

    /// The element revealed right after `element`, if any.
    #[must_use]
    pub fn element_after(&self, element: SubElement) -> Option<SubElement> {
        self.elements().find(|candidate| *candidate > element)
    }


    /// True when this step has no forward edge.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.actions, StepActions::Restart { .. })
    }

    /// True for an ending that celebrates once its last line is typed.
    #[must_use]
    pub fn celebrates_on_reveal(&self) -> bool {
        matches!(self.actions, StepActions::Restart { celebrate: true, .. })
    }

    /// True when this step is the branch point.
    #[must_use]
    pub fn is_choice(&self) -> bool {
        matches!(self.actions, StepActions::Choice { .. })
    }

    pub(crate) fn lines_mut(&mut self) -> impl Iterator<Item = &mut RevealLine> {
        std::iter::once(&mut self.headline)
            .chain(self.subtext.as_mut())
            .chain(self.line2.as_mut())
    }

    pub(crate) fn labels_mut(&mut self) -> Vec<&mut String> {
        match &mut self.actions {
            StepActions::Continue { label, .. } | StepActions::Restart { label, .. } => vec![label],
            StepActions::Choice { accept, defer } => vec![&mut accept.label, &mut defer.label],
        }
    }
}

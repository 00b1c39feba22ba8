//! Commands for the Narrative Sequencing context.

use keepsake_content::domain::step::StepId;
use keepsake_core::command::Command;
use uuid::Uuid;

use super::reveal::RevealTicket;

/// A requested move through the step graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Follow the current step's single forward edge.
    Proceed,
    /// Enter a named step; must be an edge from the current step.
    Advance(StepId),
    /// Take the accepting branch and celebrate.
    Accept,
    /// Take the "not yet" branch.
    Defer,
    /// Go back to the first step.
    Restart,
}

/// Command to move the session along the step graph.
#[derive(Debug, Clone)]
pub struct RequestTransition {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The requested move.
    pub transition: Transition,
}

impl RequestTransition {
    /// Creates a command with a fresh correlation ID.
    #[must_use]
    pub fn new(transition: Transition) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            transition,
        }
    }
}

impl Command for RequestTransition {
    fn command_type(&self) -> &'static str {
        match self.transition {
            Transition::Proceed => "narrative.proceed",
            Transition::Advance(_) => "narrative.advance",
            Transition::Accept => "narrative.accept",
            Transition::Defer => "narrative.defer",
            Transition::Restart => "narrative.restart",
        }
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command reporting that a revealer finished typing a line.
#[derive(Debug, Clone)]
pub struct CompleteReveal {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The ticket from the finished cue.
    pub ticket: RevealTicket,
}

impl CompleteReveal {
    /// Creates a command with a fresh correlation ID.
    #[must_use]
    pub fn new(ticket: RevealTicket) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            ticket,
        }
    }
}

impl Command for CompleteReveal {
    fn command_type(&self) -> &'static str {
        "narrative.complete_reveal"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

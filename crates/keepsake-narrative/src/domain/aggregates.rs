//! Aggregate roots for the Narrative Sequencing context.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use keepsake_content::domain::catalog::CardCatalog;
use keepsake_content::domain::step::{Mood, StepActions, StepContent, StepId, SubElement};
use keepsake_core::aggregate::AggregateRoot;
use keepsake_core::clock::Clock;
use keepsake_core::error::DomainError;
use keepsake_core::event::EventMetadata;
use tracing::debug;
use uuid::Uuid;

use super::events::{
    ActionsRevealed, CelebrationRequested, EntryTrigger, NarrativeEvent, NarrativeEventKind,
    StepEntered, SubRevealCompleted,
};
use super::reveal::{
    RevealCue, RevealFlags, RevealProgress, RevealState, RevealTicket, SignalOutcome,
};

/// The aggregate root for one visitor's pass through a card.
///
/// Owns the current step and its reveal progress. Every change is raised as
/// an event, applied immediately, and queued for the hosting layer, which
/// drains the queue to start reveals, cancel stale ones and fire the
/// celebration.
#[derive(Debug)]
pub struct NarrativeSequencer {
    /// Aggregate identifier.
    pub id: Uuid,
    /// The card being played.
    catalog: Arc<CardCatalog>,
    /// Current version (event count).
    pub(crate) version: i64,
    /// The step on screen.
    pub(crate) current_step: StepId,
    /// Reveal state of the step on screen.
    pub(crate) progress: RevealProgress,
    /// Bumped on every step entry; tickets from older entries are stale.
    pub(crate) generation: u64,
    /// When the current step was entered.
    pub(crate) entered_at: DateTime<Utc>,
    /// Events raised since the last drain.
    uncommitted_events: Vec<NarrativeEvent>,
}

impl NarrativeSequencer {
    /// Mounts a session on the card's initial step and cues its headline.
    #[must_use]
    pub fn mount(id: Uuid, catalog: Arc<CardCatalog>, clock: &dyn Clock) -> Self {
        let initial = catalog.initial().clone();
        let progress = RevealProgress::entering(catalog.initial_step());
        let mut sequencer = Self {
            id,
            catalog,
            version: 0,
            current_step: initial.clone(),
            progress,
            generation: 0,
            entered_at: clock.now(),
            uncommitted_events: Vec::new(),
        };
        sequencer.enter(initial, EntryTrigger::Mount, clock);
        sequencer
    }

    /// The card being played.
    #[must_use]
    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    /// The step on screen.
    #[must_use]
    pub fn current_step(&self) -> &StepId {
        &self.current_step
    }

    /// Content of the step on screen.
    #[must_use]
    pub fn content(&self) -> &StepContent {
        self.catalog
            .step(&self.current_step)
            .unwrap_or_else(|| self.catalog.initial_step())
    }

    /// Reveal state of the step on screen.
    #[must_use]
    pub fn progress(&self) -> &RevealProgress {
        &self.progress
    }

    /// Completion flags of the step on screen.
    #[must_use]
    pub fn flags(&self) -> RevealFlags {
        self.progress.flags()
    }

    /// Mood for the decoration layer.
    #[must_use]
    pub fn mood(&self) -> Mood {
        self.content().mood
    }

    /// Current step-entry generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ticket of the line currently being revealed, if any.
    #[must_use]
    pub fn active_ticket(&self) -> Option<RevealTicket> {
        self.progress.revealing().map(|element| RevealTicket {
            generation: self.generation,
            element,
        })
    }

    /// Enters `next`, which must be an edge of the path graph from the
    /// current step. The current step's actions must already be visible.
    ///
    /// A choice edge taken here is recorded as `EntryTrigger::Advance` and
    /// never celebrates; use `accept` or `defer` for the buttons.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownStep` if `next` is not in the card,
    /// `DomainError::InvalidTransition` if there is no such edge, and
    /// `DomainError::ActionsNotRevealed` if the buttons are still hidden.
    /// State is untouched on error.
    pub fn advance(&mut self, next: &StepId, clock: &dyn Clock) -> Result<(), DomainError> {
        if self.catalog.step(next).is_none() {
            return Err(DomainError::UnknownStep(next.to_string()));
        }
        if !self.catalog.is_edge(&self.current_step, next) {
            return Err(DomainError::InvalidTransition {
                from: self.current_step.to_string(),
                to: next.to_string(),
            });
        }
        self.ensure_actions_visible()?;

        let trigger = match &self.content().actions {
            StepActions::Continue { .. } => EntryTrigger::Continue,
            StepActions::Choice { .. } => EntryTrigger::Advance,
            StepActions::Restart { .. } => EntryTrigger::Restart,
        };
        self.enter(next.clone(), trigger, clock);
        Ok(())
    }

    /// Follows the current step's single forward edge.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NoForwardEdge` on choice and terminal steps and
    /// `DomainError::ActionsNotRevealed` if the buttons are still hidden.
    pub fn proceed(&mut self, clock: &dyn Clock) -> Result<(), DomainError> {
        let StepActions::Continue { next, .. } = &self.content().actions else {
            return Err(DomainError::NoForwardEdge(self.current_step.to_string()));
        };
        let next = next.clone();
        self.advance(&next, clock)
    }

    /// Takes the accepting branch: requests the celebration, then enters the
    /// accept target.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAtChoice` off the choice step and
    /// `DomainError::ActionsNotRevealed` if the buttons are still hidden.
    pub fn accept(&mut self, clock: &dyn Clock) -> Result<(), DomainError> {
        let next = self.choice_target(true)?;
        self.ensure_actions_visible()?;

        let step = self.current_step.clone();
        self.raise(
            NarrativeEventKind::CelebrationRequested(CelebrationRequested { step }),
            clock,
        );
        self.enter(next, EntryTrigger::Accept, clock);
        Ok(())
    }

    /// Takes the "not yet" branch. No celebration.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotAtChoice` off the choice step and
    /// `DomainError::ActionsNotRevealed` if the buttons are still hidden.
    pub fn defer(&mut self, clock: &dyn Clock) -> Result<(), DomainError> {
        let next = self.choice_target(false)?;
        self.ensure_actions_visible()?;
        self.enter(next, EntryTrigger::Defer, clock);
        Ok(())
    }

    /// Re-enters the initial step from anywhere, with fresh reveal progress.
    pub fn restart(&mut self, clock: &dyn Clock) {
        let initial = self.catalog.initial().clone();
        self.enter(initial, EntryTrigger::Restart, clock);
    }

    /// Handles a revealer's completion signal.
    ///
    /// Marks the ticket's element complete, then either cues the next line or
    /// reveals the buttons. Stale, duplicate and out-of-order signals change
    /// nothing.
    pub fn on_sub_reveal_complete(
        &mut self,
        ticket: RevealTicket,
        clock: &dyn Clock,
    ) -> SignalOutcome {
        if ticket.generation != self.generation {
            debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                element = %ticket.element,
                "ignoring stale reveal completion"
            );
            return SignalOutcome::Stale;
        }

        let outcome = match self.progress.state(ticket.element) {
            None => SignalOutcome::UnknownElement,
            Some(RevealState::Hidden) => SignalOutcome::OutOfOrder,
            Some(RevealState::Complete) => SignalOutcome::Duplicate,
            Some(RevealState::Revealing) => SignalOutcome::Applied,
        };
        if outcome != SignalOutcome::Applied {
            debug!(element = %ticket.element, ?outcome, "ignoring reveal completion");
            return outcome;
        }

        let step = self.current_step.clone();
        self.raise(
            NarrativeEventKind::SubRevealCompleted(SubRevealCompleted {
                step: step.clone(),
                element: ticket.element,
            }),
            clock,
        );
        if let Some(next) = self.content().element_after(ticket.element) {
            self.cue(next, clock);
        } else {
            // Reached once per entry: the last line completes exactly once.
            if self.content().celebrates_on_reveal() {
                self.raise(
                    NarrativeEventKind::CelebrationRequested(CelebrationRequested {
                        step: step.clone(),
                    }),
                    clock,
                );
            }
            self.raise(
                NarrativeEventKind::ActionsRevealed(ActionsRevealed { step }),
                clock,
            );
        }
        SignalOutcome::Applied
    }

    fn choice_target(&self, accepting: bool) -> Result<StepId, DomainError> {
        match &self.content().actions {
            StepActions::Choice { accept, defer } => Ok(if accepting {
                accept.next.clone()
            } else {
                defer.next.clone()
            }),
            _ => Err(DomainError::NotAtChoice(self.current_step.to_string())),
        }
    }

    fn ensure_actions_visible(&self) -> Result<(), DomainError> {
        if self.progress.actions_visible() {
            Ok(())
        } else {
            Err(DomainError::ActionsNotRevealed(self.current_step.to_string()))
        }
    }

    fn enter(&mut self, step: StepId, trigger: EntryTrigger, clock: &dyn Clock) {
        let from = (trigger != EntryTrigger::Mount).then(|| self.current_step.clone());
        self.raise(
            NarrativeEventKind::StepEntered(StepEntered {
                step,
                from,
                trigger,
            }),
            clock,
        );
        self.cue(SubElement::Headline, clock);
    }

    /// Cues `element` to start at the later of now and its configured offset
    /// from step entry.
    fn cue(&mut self, element: SubElement, clock: &dyn Clock) {
        let Some(line) = self.content().line(element) else {
            return;
        };
        let start_delay = line
            .delay()
            .saturating_sub(clock.elapsed_since(self.entered_at));

        let cue = RevealCue {
            ticket: RevealTicket {
                generation: self.generation,
                element,
            },
            step: self.current_step.clone(),
            text: line.text.clone(),
            speed_ms: line.speed_ms,
            start_delay_ms: u64::try_from(start_delay.as_millis()).unwrap_or(u64::MAX),
        };
        self.raise(NarrativeEventKind::RevealCued(cue), clock);
    }

    /// Applies `kind` and queues it for the host.
    fn raise(&mut self, kind: NarrativeEventKind, clock: &dyn Clock) {
        let generation = match kind {
            NarrativeEventKind::StepEntered(_) => self.generation + 1,
            _ => self.generation,
        };
        let event = NarrativeEvent {
            metadata: EventMetadata {
                event_id: Uuid::now_v7(),
                event_type: kind.event_type().to_owned(),
                session_id: self.id,
                sequence_number: self.version + 1,
                generation,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }
}

impl AggregateRoot for NarrativeSequencer {
    type Event = NarrativeEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            NarrativeEventKind::StepEntered(payload) => {
                self.current_step = payload.step.clone();
                self.generation = event.metadata.generation;
                self.progress = RevealProgress::entering(self.content());
                self.entered_at = event.metadata.occurred_at;
            }
            NarrativeEventKind::RevealCued(cue) => {
                self.progress.begin(cue.ticket.element);
            }
            NarrativeEventKind::SubRevealCompleted(payload) => {
                self.progress.complete(payload.element);
            }
            NarrativeEventKind::ActionsRevealed(_) => {
                self.progress.reveal_actions();
            }
            NarrativeEventKind::CelebrationRequested(_) => {}
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }
}

//! Command handlers for the Narrative Sequencing context.
//!
//! The `Director` owns one session's sequencer and carries out the side
//! effects of the events it raises: starting reveals, cancelling the ones a
//! step change orphaned, and firing the celebration.

use std::sync::Arc;

use keepsake_content::domain::catalog::CardCatalog;
use keepsake_core::aggregate::AggregateRoot;
use keepsake_core::celebration::Celebration;
use keepsake_core::clock::Clock;
use keepsake_core::command::Command;
use keepsake_core::error::DomainError;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::query_handlers::{SessionView, session_view};
use super::revealer::{RevealHandle, TextRevealer};
use crate::domain::aggregates::NarrativeSequencer;
use crate::domain::commands::{CompleteReveal, RequestTransition, Transition};
use crate::domain::events::{NarrativeEvent, NarrativeEventKind};
use crate::domain::reveal::{RevealTicket, SignalOutcome};

/// Runs one session: routes commands to the sequencer and reacts to the
/// events it raises.
///
/// Completion tickets from the revealer arrive on the receiver returned by
/// `mount`; the host feeds them back through `reveal_completed`.
pub struct Director {
    sequencer: NarrativeSequencer,
    revealer: Arc<dyn TextRevealer>,
    celebration: Arc<dyn Celebration>,
    clock: Arc<dyn Clock>,
    completions: UnboundedSender<RevealTicket>,
    pending: Vec<RevealHandle>,
}

impl Director {
    /// Mounts a session on `catalog` and starts revealing the first
    /// headline.
    ///
    /// Must be called inside a tokio runtime if `revealer` spawns tasks.
    #[must_use]
    pub fn mount(
        catalog: Arc<CardCatalog>,
        revealer: Arc<dyn TextRevealer>,
        celebration: Arc<dyn Celebration>,
        clock: Arc<dyn Clock>,
    ) -> (Self, UnboundedReceiver<RevealTicket>) {
        let session_id = Uuid::new_v4();
        let (completions, receiver) = mpsc::unbounded_channel();
        let sequencer = NarrativeSequencer::mount(session_id, catalog, clock.as_ref());
        info!(
            %session_id,
            card = sequencer.catalog().name(),
            step = %sequencer.current_step(),
            "session mounted"
        );

        let mut director = Self {
            sequencer,
            revealer,
            celebration,
            clock,
            completions,
            pending: Vec::new(),
        };
        let events = director.sequencer.take_uncommitted_events();
        director.dispatch(&events);
        (director, receiver)
    }

    /// Handles a `RequestTransition` command and returns the events it
    /// raised.
    ///
    /// # Errors
    ///
    /// Returns the sequencer's `DomainError` when the move is not allowed.
    /// Nothing changes in that case.
    #[instrument(
        skip(self, command),
        fields(
            session_id = %self.sequencer.id,
            command = command.command_type(),
            correlation_id = %command.correlation_id,
        )
    )]
    pub fn handle_transition(
        &mut self,
        command: &RequestTransition,
    ) -> Result<Vec<NarrativeEvent>, DomainError> {
        let clock = self.clock.as_ref();
        let result = match &command.transition {
            Transition::Proceed => self.sequencer.proceed(clock),
            Transition::Advance(next) => self.sequencer.advance(next, clock),
            Transition::Accept => self.sequencer.accept(clock),
            Transition::Defer => self.sequencer.defer(clock),
            Transition::Restart => {
                self.sequencer.restart(clock);
                Ok(())
            }
        };
        if let Err(error) = result {
            warn!(%error, step = %self.sequencer.current_step(), "transition rejected");
            return Err(error);
        }

        let events = self.sequencer.take_uncommitted_events();
        self.dispatch(&events);
        info!(
            step = %self.sequencer.current_step(),
            generation = self.sequencer.generation(),
            "step entered"
        );
        Ok(events)
    }

    /// Handles a `CompleteReveal` command.
    #[instrument(
        skip(self, command),
        fields(
            session_id = %self.sequencer.id,
            correlation_id = %command.correlation_id,
            element = %command.ticket.element,
        )
    )]
    pub fn handle_complete_reveal(&mut self, command: &CompleteReveal) -> Vec<NarrativeEvent> {
        self.reveal_completed(command.ticket)
    }

    /// Feeds a completion ticket from the revealer back into the sequencer.
    ///
    /// Returns the events raised, which is empty for stale, duplicate and
    /// out-of-order tickets.
    pub fn reveal_completed(&mut self, ticket: RevealTicket) -> Vec<NarrativeEvent> {
        self.pending.retain(|handle| handle.ticket() != ticket);

        let outcome = self
            .sequencer
            .on_sub_reveal_complete(ticket, self.clock.as_ref());
        if outcome != SignalOutcome::Applied {
            return Vec::new();
        }

        let events = self.sequencer.take_uncommitted_events();
        self.dispatch(&events);
        events
    }

    /// The sequencer this director drives.
    #[must_use]
    pub fn sequencer(&self) -> &NarrativeSequencer {
        &self.sequencer
    }

    /// What the visitor may see right now.
    #[must_use]
    pub fn view(&self) -> SessionView {
        session_view(&self.sequencer)
    }

    /// Number of reveals started and not yet finished or cancelled.
    #[must_use]
    pub fn pending_reveals(&self) -> usize {
        self.pending.len()
    }

    fn dispatch(&mut self, events: &[NarrativeEvent]) {
        for event in events {
            match &event.kind {
                NarrativeEventKind::StepEntered(entered) => {
                    debug!(
                        step = %entered.step,
                        trigger = ?entered.trigger,
                        cancelled = self.pending.len(),
                        "cancelling reveals of the previous step"
                    );
                    self.cancel_pending();
                }
                NarrativeEventKind::RevealCued(cue) => {
                    debug!(
                        element = %cue.ticket.element,
                        start_delay_ms = cue.start_delay_ms,
                        "starting reveal"
                    );
                    let handle = self.revealer.start(cue.clone(), self.completions.clone());
                    self.pending.push(handle);
                }
                NarrativeEventKind::SubRevealCompleted(_) => {}
                NarrativeEventKind::ActionsRevealed(revealed) => {
                    debug!(step = %revealed.step, "actions revealed");
                }
                NarrativeEventKind::CelebrationRequested(requested) => {
                    info!(step = %requested.step, "celebrating");
                    self.celebration.trigger();
                }
            }
        }
        self.pending.retain(|handle| !handle.is_finished());
    }

    fn cancel_pending(&mut self) {
        for handle in self.pending.drain(..) {
            handle.cancel();
        }
    }
}

impl Drop for Director {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

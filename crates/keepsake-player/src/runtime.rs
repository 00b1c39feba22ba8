//! The player loop: feeds revealer completions and visitor actions to the
//! director until the visitor leaves.

use async_trait::async_trait;
use keepsake_content::domain::step::StepId;
use keepsake_core::error::DomainError;
use keepsake_narrative::application::command_handlers::Director;
use keepsake_narrative::application::query_handlers::{ActionsView, SessionView};
use keepsake_narrative::domain::commands::{RequestTransition, Transition};
use keepsake_narrative::domain::events::{NarrativeEvent, NarrativeEventKind};
use keepsake_narrative::domain::reveal::RevealTicket;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

/// Something the visitor did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Pressed the single button of the step (on an ending, start over).
    Continue,
    /// Pressed the accepting button.
    Accept,
    /// Pressed the "not yet" button.
    Defer,
    /// Asked to start over.
    Restart,
    /// Closed the card.
    Quit,
}

impl PlayerAction {
    /// Parses one line of terminal input.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "c" => Some(Self::Continue),
            "y" | "a" | "yes" => Some(Self::Accept),
            "n" | "d" | "no" => Some(Self::Defer),
            "r" => Some(Self::Restart),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }

    /// The transition this action asks for on a step showing `view`.
    /// `None` for `Quit`.
    #[must_use]
    pub fn transition(self, view: &SessionView) -> Option<Transition> {
        match self {
            Self::Continue if matches!(view.actions, Some(ActionsView::Restart { .. })) => {
                Some(Transition::Restart)
            }
            Self::Continue => Some(Transition::Proceed),
            Self::Accept => Some(Transition::Accept),
            Self::Defer => Some(Transition::Defer),
            Self::Restart => Some(Transition::Restart),
            Self::Quit => None,
        }
    }
}

/// Where visitor actions come from.
///
/// `next_action` may be dropped before it resolves whenever a reveal
/// completes first, and is then called again with a fresh view, so
/// implementations must not lose input when cancelled.
#[async_trait]
pub trait ActionSource: Send {
    /// Waits for the visitor's next action. `None` means the input is gone.
    async fn next_action(&mut self, view: SessionView) -> Option<PlayerAction>;
}

/// Draws everything except the typed text itself.
pub trait Stage: Send + Sync {
    /// A step has been entered.
    fn step_entered(&self, view: &SessionView);

    /// A step's buttons have appeared.
    fn actions_shown(&self, view: &SessionView);

    /// An action was refused.
    fn rejected(&self, error: &DomainError);
}

/// What happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps entered, in order, starting with the initial step.
    pub visited: Vec<StepId>,
    /// Number of times the celebration was requested.
    pub celebrations: usize,
    /// Number of refused actions.
    pub rejections: usize,
    /// The step on screen when the run ended.
    pub final_step: StepId,
}

/// Plays `director`'s session until `source` runs dry or the visitor quits.
pub async fn play(
    director: &mut Director,
    completions: &mut UnboundedReceiver<RevealTicket>,
    source: &mut dyn ActionSource,
    stage: &dyn Stage,
) -> RunSummary {
    let mut summary = RunSummary {
        visited: vec![director.sequencer().current_step().clone()],
        celebrations: 0,
        rejections: 0,
        final_step: director.sequencer().current_step().clone(),
    };
    stage.step_entered(&director.view());

    loop {
        let view = director.view();
        tokio::select! {
            biased;

            ticket = completions.recv() => {
                let Some(ticket) = ticket else {
                    debug!("completion channel closed");
                    break;
                };
                let events = director.reveal_completed(ticket);
                present(director, &events, stage, &mut summary);
            }
            action = source.next_action(view.clone()) => {
                let Some(transition) = action.and_then(|action| action.transition(&view)) else {
                    info!(step = %view.step, "visitor left");
                    break;
                };
                match director.handle_transition(&RequestTransition::new(transition)) {
                    Ok(events) => present(director, &events, stage, &mut summary),
                    Err(error) => {
                        summary.rejections += 1;
                        stage.rejected(&error);
                    }
                }
            }
        }
    }

    summary.final_step = director.sequencer().current_step().clone();
    summary
}

fn present(
    director: &Director,
    events: &[NarrativeEvent],
    stage: &dyn Stage,
    summary: &mut RunSummary,
) {
    for event in events {
        match &event.kind {
            NarrativeEventKind::StepEntered(entered) => {
                summary.visited.push(entered.step.clone());
                stage.step_entered(&director.view());
            }
            NarrativeEventKind::ActionsRevealed(_) => stage.actions_shown(&director.view()),
            NarrativeEventKind::CelebrationRequested(_) => summary.celebrations += 1,
            NarrativeEventKind::RevealCued(_) | NarrativeEventKind::SubRevealCompleted(_) => {}
        }
    }
}

//! Unattended playback.

use async_trait::async_trait;
use keepsake_narrative::application::query_handlers::{ActionsView, SessionView};
use tokio::time::{Duration, sleep};

use crate::config::AutoplayChoice;
use crate::runtime::{ActionSource, PlayerAction};

/// Presses each step's button once it appears, takes a fixed branch at the
/// choice, and quits on the ending.
#[derive(Debug, Clone)]
pub struct Autoplay {
    choice: AutoplayChoice,
    pause: Duration,
}

impl Autoplay {
    /// Autoplay taking `choice`, pausing `pause` before each press.
    #[must_use]
    pub fn new(choice: AutoplayChoice, pause: Duration) -> Self {
        Self { choice, pause }
    }
}

#[async_trait]
impl ActionSource for Autoplay {
    async fn next_action(&mut self, view: SessionView) -> Option<PlayerAction> {
        let Some(actions) = view.actions else {
            // Buttons hidden: wait for the next reveal to re-poll.
            return std::future::pending().await;
        };
        sleep(self.pause).await;
        Some(match actions {
            ActionsView::Continue { .. } => PlayerAction::Continue,
            ActionsView::Choice { .. } => match self.choice {
                AutoplayChoice::Accept => PlayerAction::Accept,
                AutoplayChoice::Defer => PlayerAction::Defer,
            },
            ActionsView::Restart { .. } => PlayerAction::Quit,
        })
    }
}

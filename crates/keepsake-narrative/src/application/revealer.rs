//! The contract between the director and whatever types lines out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;

use crate::domain::reveal::{RevealCue, RevealTicket};

/// Types one line out over time.
///
/// `start` must return promptly. When the line is fully rendered the
/// implementation sends the cue's ticket on `done`, exactly once, unless the
/// returned handle was cancelled first. Sends after cancellation are tolerated
/// by the director but should be avoided.
pub trait TextRevealer: Send + Sync {
    /// Begins revealing `cue`.
    fn start(&self, cue: RevealCue, done: UnboundedSender<RevealTicket>) -> RevealHandle;
}

/// Handle to one in-flight reveal.
///
/// Cancelling sets a shared flag the revealer polls between characters and
/// aborts its task if it has one.
#[derive(Debug)]
pub struct RevealHandle {
    ticket: RevealTicket,
    cancelled: Arc<AtomicBool>,
    task: Option<AbortHandle>,
}

impl RevealHandle {
    /// Handle for a reveal running on a tokio task.
    #[must_use]
    pub fn new(ticket: RevealTicket, cancelled: Arc<AtomicBool>, task: AbortHandle) -> Self {
        Self {
            ticket,
            cancelled,
            task: Some(task),
        }
    }

    /// Handle for a reveal with no task of its own, such as one that
    /// completes synchronously or is driven by a test.
    #[must_use]
    pub fn detached(ticket: RevealTicket, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            ticket,
            cancelled,
            task: None,
        }
    }

    /// The ticket of the cue this handle belongs to.
    #[must_use]
    pub fn ticket(&self) -> RevealTicket {
        self.ticket
    }

    /// Stops the reveal. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// True if the reveal's task has finished. Detached handles report
    /// `false`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_some_and(AbortHandle::is_finished)
    }
}

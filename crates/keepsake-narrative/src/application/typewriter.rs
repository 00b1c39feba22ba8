//! Character-by-character revealer on tokio timers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use super::revealer::{RevealHandle, TextRevealer};
use crate::domain::reveal::{RevealCue, RevealTicket};

/// Where typed text is drawn.
pub trait TextSink: Send + Sync {
    /// Called after each character with the text typed so far.
    fn frame(&self, cue: &RevealCue, typed: &str);

    /// Called once the whole line is on screen.
    fn finished(&self, cue: &RevealCue);
}

/// Types a cue's text one character at a time.
///
/// Waits out the cue's start delay, then sleeps `speed` before each
/// character. Every wait checks the cancellation flag, so a cancelled reveal
/// draws nothing further and never reports completion.
pub struct TypewriterRevealer {
    sink: Arc<dyn TextSink>,
}

impl TypewriterRevealer {
    /// Creates a revealer drawing into `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn TextSink>) -> Self {
        Self { sink }
    }
}

impl TextRevealer for TypewriterRevealer {
    fn start(&self, cue: RevealCue, done: UnboundedSender<RevealTicket>) -> RevealHandle {
        let ticket = cue.ticket;
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let sink = Arc::clone(&self.sink);

        let task = tokio::spawn(async move {
            tokio::time::sleep(cue.start_delay()).await;

            let mut typed = String::with_capacity(cue.text.len());
            for ch in cue.text.chars() {
                tokio::time::sleep(cue.speed()).await;
                if flag.load(Ordering::Acquire) {
                    trace!(element = %ticket.element, "reveal cancelled");
                    return;
                }
                typed.push(ch);
                sink.frame(&cue, &typed);
            }

            if flag.load(Ordering::Acquire) {
                return;
            }
            sink.finished(&cue);
            // The director may already be gone; nothing left to report to.
            let _ = done.send(ticket);
        });

        RevealHandle::new(ticket, cancelled, task.abort_handle())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use keepsake_content::domain::step::{StepId, SubElement};
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct RecordingSink {
        frames: Mutex<Vec<String>>,
        finished: Mutex<usize>,
    }

    impl TextSink for RecordingSink {
        fn frame(&self, _cue: &RevealCue, typed: &str) {
            self.frames.lock().unwrap().push(typed.to_owned());
        }

        fn finished(&self, _cue: &RevealCue) {
            *self.finished.lock().unwrap() += 1;
        }
    }

    fn cue(text: &str, start_delay_ms: u64) -> RevealCue {
        RevealCue {
            ticket: RevealTicket {
                generation: 1,
                element: SubElement::Headline,
            },
            step: StepId::new("intro"),
            text: text.to_owned(),
            speed_ms: 50,
            start_delay_ms,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_types_each_character_then_reports_completion() {
        // Arrange
        let sink = Arc::new(RecordingSink::default());
        let revealer = TypewriterRevealer::new(sink.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();

        // Act
        let _handle = revealer.start(cue("Hey", 0), tx);
        let ticket = rx.recv().await;

        // Assert
        assert_eq!(ticket.map(|t| t.element), Some(SubElement::Headline));
        assert_eq!(*sink.frames.lock().unwrap(), vec!["H", "He", "Hey"]);
        assert_eq!(*sink.finished.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_out_the_start_delay() {
        // Arrange
        let sink = Arc::new(RecordingSink::default());
        let revealer = TypewriterRevealer::new(sink.clone());
        let (tx, _rx) = mpsc::unbounded_channel();

        // Act
        let _handle = revealer.start(cue("Hi", 500), tx);
        tokio::time::sleep(Duration::from_millis(520)).await;

        // Assert: 500ms delay plus one 50ms character pause not yet elapsed.
        assert!(sink.frames.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(*sink.frames.lock().unwrap(), vec!["H"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_reveal_never_completes() {
        // Arrange
        let sink = Arc::new(RecordingSink::default());
        let revealer = TypewriterRevealer::new(sink.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = revealer.start(cue("Something long", 0), tx);
        tokio::time::sleep(Duration::from_millis(120)).await;

        // Act
        handle.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Assert
        assert_eq!(sink.frames.lock().unwrap().len(), 2);
        assert_eq!(*sink.finished.lock().unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }
}

//! Terminal rendering and input.
//!
//! Card text goes to stdout; logs go to stderr so the two never interleave
//! on the same stream.

use std::io::Write;

use async_trait::async_trait;
use keepsake_core::celebration::Celebration;
use keepsake_core::error::DomainError;
use keepsake_narrative::application::query_handlers::{ActionsView, SessionView};
use keepsake_narrative::application::typewriter::TextSink;
use keepsake_narrative::domain::reveal::RevealCue;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info, warn};

use crate::runtime::{ActionSource, PlayerAction, Stage};

/// Writes the card to stdout.
///
/// Typed frames redraw the current line in place; write errors are dropped
/// since there is nowhere left to show them.
#[derive(Debug, Default)]
pub struct TerminalStage;

impl TerminalStage {
    /// Creates a stage on stdout.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn write(text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

impl TextSink for TerminalStage {
    fn frame(&self, _cue: &RevealCue, typed: &str) {
        Self::write(&format!("\r  {typed}"));
    }

    fn finished(&self, _cue: &RevealCue) {
        Self::write("\n");
    }
}

impl Stage for TerminalStage {
    fn step_entered(&self, view: &SessionView) {
        Self::write(&format!("\n  ~ {:?} ~\n\n", view.mood).to_lowercase());
    }

    fn actions_shown(&self, view: &SessionView) {
        let prompt = match &view.actions {
            Some(ActionsView::Continue { label }) => format!("[enter] {label}"),
            Some(ActionsView::Choice { accept, defer }) => {
                format!("[y] {accept}    [n] {defer}")
            }
            Some(ActionsView::Restart { label }) => format!("[enter] {label}    [q] close"),
            None => return,
        };
        Self::write(&format!("\n  {prompt}\n"));
    }

    fn rejected(&self, error: &DomainError) {
        debug!(%error, "showing rejection");
        Self::write(&format!("  ({error})\n"));
    }
}

/// Reads actions from stdin, one per line.
///
/// Unrecognised lines are skipped; end of input or a read error closes the
/// card.
pub struct StdinSource<R = BufReader<Stdin>> {
    lines: Lines<R>,
}

impl StdinSource {
    /// Creates a source on the process's stdin.
    #[must_use]
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send> StdinSource<R> {
    /// Creates a source reading lines from `reader`.
    #[must_use]
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> ActionSource for StdinSource<R> {
    async fn next_action(&mut self, _view: SessionView) -> Option<PlayerAction> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => match PlayerAction::parse(&line) {
                    Some(action) => return Some(action),
                    None => debug!(input = %line, "ignoring unrecognised input"),
                },
                Ok(None) => return None,
                Err(error) => {
                    warn!(%error, "failed to read stdin");
                    return None;
                }
            }
        }
    }
}

/// Celebrates with a burst of hearts on stdout.
#[derive(Debug, Default)]
pub struct ConsoleCelebration;

impl Celebration for ConsoleCelebration {
    fn trigger(&self) {
        info!("confetti");
        TerminalStage::write("\n  🎉 💖 ✨ 💕 ✨ 💖 🎉\n");
    }
}

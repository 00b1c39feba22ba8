//! Shared test helpers for player integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use keepsake_content::application::loader;
use keepsake_core::error::DomainError;
use keepsake_narrative::application::command_handlers::Director;
use keepsake_narrative::application::query_handlers::SessionView;
use keepsake_narrative::application::typewriter::{TextSink, TypewriterRevealer};
use keepsake_narrative::domain::reveal::{RevealCue, RevealTicket};
use keepsake_player::runtime::{ActionSource, PlayerAction, Stage};
use keepsake_test_support::{FixedClock, RecordingCelebration};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, sleep_until};

/// Records typed frames and finished lines.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames: Mutex<Vec<(RevealTicket, String)>>,
    pub finished: Mutex<Vec<RevealTicket>>,
}

impl TextSink for RecordingSink {
    fn frame(&self, cue: &RevealCue, typed: &str) {
        self.frames
            .lock()
            .unwrap()
            .push((cue.ticket, typed.to_owned()));
    }

    fn finished(&self, cue: &RevealCue) {
        self.finished.lock().unwrap().push(cue.ticket);
    }
}

/// Records what the player asked the stage to draw.
#[derive(Debug, Default)]
pub struct RecordingStage {
    pub entered: Mutex<Vec<SessionView>>,
    pub actions: Mutex<Vec<SessionView>>,
    pub rejections: Mutex<Vec<DomainError>>,
}

impl Stage for RecordingStage {
    fn step_entered(&self, view: &SessionView) {
        self.entered.lock().unwrap().push(view.clone());
    }

    fn actions_shown(&self, view: &SessionView) {
        self.actions.lock().unwrap().push(view.clone());
    }

    fn rejected(&self, error: &DomainError) {
        self.rejections.lock().unwrap().push(error.clone());
    }
}

/// Presses buttons at fixed offsets from its creation, whatever is on
/// screen, then runs dry.
pub struct ScriptedSource {
    start: Instant,
    script: VecDeque<(Duration, PlayerAction)>,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = (Duration, PlayerAction)>) -> Self {
        Self {
            start: Instant::now(),
            script: script.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ActionSource for ScriptedSource {
    async fn next_action(&mut self, _view: SessionView) -> Option<PlayerAction> {
        let (at, action) = *self.script.front()?;
        sleep_until(self.start + at).await;
        self.script.pop_front();
        Some(action)
    }
}

/// A mounted session wired to recording collaborators.
pub struct Harness {
    pub director: Director,
    pub completions: UnboundedReceiver<RevealTicket>,
    pub sink: Arc<RecordingSink>,
    pub stage: RecordingStage,
    pub celebration: Arc<RecordingCelebration>,
}

/// Mounts the built-in card `name` with a typewriter revealer and a fixed
/// clock. Must run inside a tokio runtime.
pub fn mount(name: &str) -> Harness {
    let sink = Arc::new(RecordingSink::default());
    let celebration = Arc::new(RecordingCelebration::new());
    let clock = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 2, 14, 19, 0, 0).unwrap(),
    ));
    let (director, completions) = Director::mount(
        Arc::new(loader::builtin(name).unwrap()),
        Arc::new(TypewriterRevealer::new(sink.clone())),
        celebration.clone(),
        clock,
    );
    Harness {
        director,
        completions,
        sink,
        stage: RecordingStage::default(),
        celebration,
    }
}

//! End-to-end playthroughs of the built-in cards.

mod common;

use std::time::Duration;

use keepsake_content::domain::step::StepId;
use keepsake_core::error::DomainError;
use keepsake_player::autoplay::Autoplay;
use keepsake_player::config::AutoplayChoice;
use keepsake_player::runtime::{self, PlayerAction};

use common::ScriptedSource;

fn steps(ids: &[&str]) -> Vec<StepId> {
    ids.iter().copied().map(StepId::new).collect()
}

#[tokio::test(start_paused = true)]
async fn test_classic_accept_path_celebrates_once() {
    // Arrange
    let mut h = common::mount("classic");
    let mut source = Autoplay::new(AutoplayChoice::Accept, Duration::from_millis(300));

    // Act
    let summary = runtime::play(&mut h.director, &mut h.completions, &mut source, &h.stage).await;

    // Assert
    assert_eq!(
        summary.visited,
        steps(&["intro", "context", "tension", "question", "accepted"])
    );
    assert_eq!(summary.final_step, StepId::new("accepted"));
    assert_eq!(summary.celebrations, 1);
    assert_eq!(summary.rejections, 0);
    assert_eq!(h.celebration.trigger_count(), 1);

    // Every step's buttons appeared only after all of its lines finished.
    for view in h.stage.actions.lock().unwrap().iter() {
        assert!(view.flags.actions);
        assert!(view.flags.headline);
    }
    assert_eq!(h.stage.actions.lock().unwrap().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_classic_defer_path_never_celebrates() {
    // Arrange
    let mut h = common::mount("classic");
    let mut source = Autoplay::new(AutoplayChoice::Defer, Duration::from_millis(300));

    // Act
    let summary = runtime::play(&mut h.director, &mut h.completions, &mut source, &h.stage).await;

    // Assert
    assert_eq!(
        summary.visited,
        steps(&["intro", "context", "tension", "question", "deferred"])
    );
    assert_eq!(summary.final_step, StepId::new("deferred"));
    assert_eq!(summary.celebrations, 0);
    assert_eq!(summary.rejections, 0);
    assert_eq!(h.celebration.trigger_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_confession_card_plays_through_to_the_yes_ending() {
    // Arrange
    let mut h = common::mount("confession");
    let mut source = Autoplay::new(AutoplayChoice::Accept, Duration::from_millis(300));

    // Act
    let summary = runtime::play(&mut h.director, &mut h.completions, &mut source, &h.stage).await;

    // Assert
    assert_eq!(
        summary.visited,
        steps(&[
            "mystery",
            "memory",
            "tension",
            "vulnerable",
            "proposition",
            "reveal",
            "yes",
        ])
    );
    assert_eq!(summary.final_step, StepId::new("yes"));
    assert_eq!(summary.celebrations, 1);
    assert_eq!(h.celebration.trigger_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_greeting_card_types_every_line() {
    // Arrange
    let mut h = common::mount("greeting");
    let mut source = Autoplay::new(AutoplayChoice::Accept, Duration::from_millis(300));

    // Act
    let summary = runtime::play(&mut h.director, &mut h.completions, &mut source, &h.stage).await;

    // Assert
    assert_eq!(summary.visited, steps(&["greeting", "message", "closing"]));
    assert_eq!(summary.final_step, StepId::new("closing"));
    assert_eq!(summary.celebrations, 1);
    assert_eq!(h.celebration.trigger_count(), 1);
    assert_eq!(h.sink.finished.lock().unwrap().len(), 7);

    let frames = h.sink.frames.lock().unwrap();
    let (_, last) = frames.last().unwrap();
    assert_eq!(last.as_str(), "Love, Your Valentine");
}

#[tokio::test(start_paused = true)]
async fn test_restart_mid_reveal_cancels_the_old_line() {
    // Arrange
    let mut h = common::mount("classic");
    let first_generation = h.director.sequencer().generation();
    let mut source = ScriptedSource::new([
        (Duration::from_millis(120), PlayerAction::Restart),
        (Duration::from_millis(400), PlayerAction::Quit),
    ]);

    // Act
    let summary = runtime::play(&mut h.director, &mut h.completions, &mut source, &h.stage).await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    // Assert
    assert_eq!(summary.visited, steps(&["intro", "intro"]));
    assert_eq!(summary.rejections, 0);
    assert_eq!(h.director.sequencer().generation(), first_generation + 1);

    let frames = h.sink.frames.lock().unwrap();
    let old_frames = frames
        .iter()
        .filter(|(ticket, _)| ticket.generation == first_generation)
        .count();
    assert!((1..=3).contains(&old_frames), "old frames: {old_frames}");
    assert!(
        h.sink
            .finished
            .lock()
            .unwrap()
            .iter()
            .all(|ticket| ticket.generation != first_generation)
    );
    assert!(!h.director.view().flags.headline);
}

#[tokio::test(start_paused = true)]
async fn test_pressing_a_hidden_button_is_refused() {
    // Arrange
    let mut h = common::mount("classic");
    let mut source = ScriptedSource::new([
        (Duration::from_millis(10), PlayerAction::Continue),
        (Duration::from_millis(20), PlayerAction::Quit),
    ]);

    // Act
    let summary = runtime::play(&mut h.director, &mut h.completions, &mut source, &h.stage).await;

    // Assert
    assert_eq!(summary.rejections, 1);
    assert_eq!(summary.final_step, StepId::new("intro"));
    assert_eq!(
        *h.stage.rejections.lock().unwrap(),
        vec![DomainError::ActionsNotRevealed("intro".to_owned())]
    );
}

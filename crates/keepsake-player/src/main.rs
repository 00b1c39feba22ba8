//! Keepsake terminal player entry point.

use std::error::Error;
use std::sync::Arc;

use keepsake_core::clock::SystemClock;
use keepsake_narrative::application::command_handlers::Director;
use keepsake_narrative::application::typewriter::TypewriterRevealer;
use keepsake_player::autoplay::Autoplay;
use keepsake_player::config::PlayerConfig;
use keepsake_player::runtime::{self, ActionSource};
use keepsake_player::terminal::{ConsoleCelebration, StdinSource, TerminalStage};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Read configuration from environment.
    let config = PlayerConfig::from_env()?;

    // Initialize tracing subscriber on stderr; stdout belongs to the card.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::info!(card = ?config.card, autoplay = ?config.autoplay, "Starting Keepsake player");

    let catalog = Arc::new(config.load_catalog()?);
    let stage = Arc::new(TerminalStage::new());
    let (mut director, mut completions) = Director::mount(
        catalog,
        Arc::new(TypewriterRevealer::new(stage.clone())),
        Arc::new(ConsoleCelebration),
        Arc::new(SystemClock),
    );

    let mut source: Box<dyn ActionSource> = match config.autoplay {
        Some(choice) => Box::new(Autoplay::new(choice, config.autoplay_pause)),
        None => Box::new(StdinSource::new()),
    };

    let summary =
        runtime::play(&mut director, &mut completions, source.as_mut(), stage.as_ref()).await;

    tracing::info!(
        steps = summary.visited.len(),
        final_step = %summary.final_step,
        celebrations = summary.celebrations,
        "Card closed"
    );

    Ok(())
}

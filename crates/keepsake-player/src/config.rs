//! Player configuration, read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use keepsake_content::application::loader;
use keepsake_content::domain::catalog::CardCatalog;

use crate::error::PlayerError;

/// Built-in card played when neither `KEEPSAKE_CARD` nor `KEEPSAKE_VARIANT`
/// is set.
pub const DEFAULT_VARIANT: &str = "classic";

/// Pause autoplay leaves between the buttons appearing and pressing one.
pub const DEFAULT_AUTOPLAY_PAUSE: Duration = Duration::from_millis(1200);

/// Where the card comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardSource {
    /// One of the cards shipped with the player.
    Builtin(String),
    /// A YAML card on disk.
    File(PathBuf),
}

/// Which branch autoplay takes at the choice step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoplayChoice {
    /// Press the accepting button.
    Accept,
    /// Press the "not yet" button.
    Defer,
}

/// Everything the player needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// The card to play.
    pub card: CardSource,
    /// Substituted for `{recipient}`.
    pub recipient: Option<String>,
    /// Substituted for `{sender}`.
    pub sender: Option<String>,
    /// Play without input, taking this branch. `None` reads stdin.
    pub autoplay: Option<AutoplayChoice>,
    /// Pause between autoplay presses.
    pub autoplay_pause: Duration,
    /// Emit JSON logs.
    pub log_json: bool,
}

impl PlayerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Config` if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, PlayerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Config` if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PlayerError> {
        let card = match lookup("KEEPSAKE_CARD").filter(|path| !path.is_empty()) {
            Some(path) => CardSource::File(PathBuf::from(path)),
            None => CardSource::Builtin(
                lookup("KEEPSAKE_VARIANT").unwrap_or_else(|| DEFAULT_VARIANT.to_owned()),
            ),
        };

        let autoplay = if parse_flag("KEEPSAKE_AUTOPLAY", lookup("KEEPSAKE_AUTOPLAY"))? {
            let choice = match lookup("KEEPSAKE_AUTOPLAY_CHOICE").as_deref() {
                None | Some("accept") => AutoplayChoice::Accept,
                Some("defer") => AutoplayChoice::Defer,
                Some(other) => {
                    return Err(PlayerError::Config(format!(
                        "KEEPSAKE_AUTOPLAY_CHOICE must be accept or defer, got {other:?}"
                    )));
                }
            };
            Some(choice)
        } else {
            None
        };

        Ok(Self {
            card,
            recipient: lookup("KEEPSAKE_RECIPIENT").filter(|name| !name.trim().is_empty()),
            sender: lookup("KEEPSAKE_SENDER").filter(|name| !name.trim().is_empty()),
            autoplay,
            autoplay_pause: DEFAULT_AUTOPLAY_PAUSE,
            log_json: parse_flag("KEEPSAKE_LOG_JSON", lookup("KEEPSAKE_LOG_JSON"))?,
        })
    }

    /// Loads the configured card and applies the configured names.
    ///
    /// # Errors
    ///
    /// Returns `PlayerError::Content` if the card cannot be read, parsed or
    /// validated.
    pub fn load_catalog(&self) -> Result<CardCatalog, PlayerError> {
        let mut config = match &self.card {
            CardSource::Builtin(name) => loader::builtin_config(name)?,
            CardSource::File(path) => loader::read_config(path)?,
        };
        if let Some(recipient) = &self.recipient {
            config.personalization.recipient = Some(recipient.clone());
        }
        if let Some(sender) = &self.sender {
            config.personalization.sender = Some(sender.clone());
        }
        Ok(loader::build_catalog(config)?)
    }
}

fn parse_flag(key: &str, value: Option<String>) -> Result<bool, PlayerError> {
    match value.as_deref().map(str::trim) {
        None | Some("" | "0" | "false" | "no") => Ok(false),
        Some("1" | "true" | "yes") => Ok(true),
        Some(other) => Err(PlayerError::Config(format!(
            "{key} must be true or false, got {other:?}"
        ))),
    }
}

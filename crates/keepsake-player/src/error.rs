//! Startup error types for the Keepsake player.

use keepsake_content::error::ContentError;
use thiserror::Error;

/// Startup errors for the terminal player.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// An environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The card could not be loaded or is not a valid narrative.
    #[error("card error: {0}")]
    Content(#[from] ContentError),
}

//! Loading cards from YAML.
//!
//! Cards are authored as YAML documents (see `cards/` for the built-ins).
//! Loading is two-phase so hosts can adjust the raw `CardConfig`, typically
//! its personalization, before `CardCatalog::build` validates it.

use std::path::Path;

use tracing::{debug, info};

use crate::domain::catalog::{CardCatalog, CardConfig};
use crate::error::ContentError;

const CLASSIC: &str = include_str!("../../cards/classic.yaml");
const CONFESSION: &str = include_str!("../../cards/confession.yaml");
const GREETING: &str = include_str!("../../cards/greeting.yaml");

/// Names of the cards shipped with the crate.
pub const BUILTIN_CARDS: [&str; 3] = ["classic", "confession", "greeting"];

/// Parses a card from YAML without validating it.
///
/// # Errors
///
/// Returns `ContentError::Parse` if the document is not a card.
pub fn parse_config(source: &str) -> Result<CardConfig, ContentError> {
    Ok(serde_yaml::from_str(source)?)
}

/// Reads and parses a card file without validating it.
///
/// # Errors
///
/// Returns `ContentError::Io` if the file cannot be read and
/// `ContentError::Parse` if it is not a card.
pub fn read_config(path: &Path) -> Result<CardConfig, ContentError> {
    debug!(path = %path.display(), "reading card");
    let source = std::fs::read_to_string(path)?;
    parse_config(&source)
}

/// Returns the raw config of a built-in card.
///
/// # Errors
///
/// Returns `ContentError::UnknownBuiltin` for names outside `BUILTIN_CARDS`.
pub fn builtin_config(name: &str) -> Result<CardConfig, ContentError> {
    let source = match name {
        "classic" => CLASSIC,
        "confession" => CONFESSION,
        "greeting" => GREETING,
        other => return Err(ContentError::UnknownBuiltin(other.to_owned())),
    };
    parse_config(source)
}

/// Validates a config and logs what was loaded.
///
/// # Errors
///
/// Returns the validation error from `CardCatalog::build`.
pub fn build_catalog(config: CardConfig) -> Result<CardCatalog, ContentError> {
    let catalog = CardCatalog::build(config)?;
    info!(
        card = catalog.name(),
        steps = catalog.steps().len(),
        fingerprint = %catalog.fingerprint(),
        "card loaded"
    );
    Ok(catalog)
}

/// Parses and validates a card from YAML.
///
/// # Errors
///
/// Returns `ContentError` if parsing or validation fails.
pub fn from_yaml_str(source: &str) -> Result<CardCatalog, ContentError> {
    build_catalog(parse_config(source)?)
}

/// Loads and validates a built-in card.
///
/// # Errors
///
/// Returns `ContentError::UnknownBuiltin` for names outside `BUILTIN_CARDS`.
pub fn builtin(name: &str) -> Result<CardCatalog, ContentError> {
    build_catalog(builtin_config(name)?)
}

//! Error type for the HUD settings layer.

use speedo_config::ConfigError;
use thiserror::Error;

/// Errors raised while editing or persisting HUD settings.
///
/// Reading settings never fails (every field falls back to its default), so
/// this type only shows up on the write path and when parsing user input.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The underlying store could not be read or written.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A name given for an enumerated setting is not one of its variants.
    #[error("'{value}' is not a valid value for {key}")]
    UnknownVariant { key: &'static str, value: String },
}

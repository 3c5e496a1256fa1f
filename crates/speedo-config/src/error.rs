//! Error type for settings file operations.
//!
//! On the read side only genuine I/O failures are errors.  A missing file, a
//! malformed line or a value that does not parse as the requested type are
//! all absorbed inside the store: configuration access should degrade to
//! defaults, never halt the HUD.  On the write side a key or value that
//! cannot be written as a single line is refused up front.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for [`crate::ConfigStore`] operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading the backing file, creating its directory, or writing the
    /// temporary replacement file failed.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The finished temporary file could not be renamed over the backing file.
    #[error("failed to replace config at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A write was refused because the section, key or value would not read
    /// back as written (a line break, an `=` in the key, and so on).
    #[error("cannot store [{section}] {key:?}: {reason}")]
    InvalidEntry {
        section: String,
        key: String,
        reason: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_entry(section: &str, key: &str, reason: &'static str) -> Self {
        ConfigError::InvalidEntry {
            section: section.to_string(),
            key: key.to_string(),
            reason,
        }
    }

    /// Path of the file or directory the failed operation was touching;
    /// `None` for a refused write, which never reaches the file system.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ConfigError::Io { path, .. } | ConfigError::Persist { path, .. } => Some(path),
            ConfigError::InvalidEntry { .. } => None,
        }
    }
}

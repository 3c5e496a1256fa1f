//! Infrastructure: where the settings file lives and how it is opened.

pub mod settings_file;

pub use settings_file::{open_settings, DEFAULT_SETTINGS_PATH};

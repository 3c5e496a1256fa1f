//! speedo-hud library entry point.
//!
//! The speedometer HUD's persisted settings model, its trip odometer
//! snapshots and the use cases behind the `speedo` command-line tool, all
//! built on the `speedo-config` store.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::SettingsError;

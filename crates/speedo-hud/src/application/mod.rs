//! Application layer use cases for the HUD settings tool.
//!
//! Use cases here orchestrate the domain types against a store.  They depend
//! on [`speedo_config::KeyValueStore`] where they can, so tests run them
//! against an in-memory or mocked store; only the trip snapshot worker needs
//! the concrete file-backed store for its flush.
//!
//! # Sub-modules
//!
//! - **`edit_settings`** – Load, change and save the HUD settings for one
//!   user edit (display mode, units, colour nudges, display reset).
//!
//! - **`trip_log`** – The `[Stats]` trip odometer and its background
//!   "save on pause" snapshot.

pub mod edit_settings;
pub mod trip_log;

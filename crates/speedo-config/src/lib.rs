//! # speedo-config
//!
//! Persistent settings store for the speedometer HUD: a thread-safe,
//! lazily-loaded key/value store backed by an INI-style text file that it
//! rewrites without disturbing anything it did not change.
//!
//! # Architecture overview (for beginners)
//!
//! The file looks like this:
//!
//! ```text
//! ; comments and unknown lines are kept as-is
//! [Core]
//! UseMph=False
//! DisplayMode=1
//!
//! [UI]
//! PanelWidth=66
//! ```
//!
//! The crate is split into three layers:
//!
//! - **`document`** – The line grammar, the parser that turns file text into
//!   ordered section/key maps, and the merge that folds pending writes back
//!   into the original text.
//!
//! - **`store`** – [`ConfigStore`], which owns the file: a cache of every
//!   known value, a dirty cache of unflushed writes, one mutex around both,
//!   and the atomic temp-file-and-rename flush.
//!
//! - **`typed`** – [`TypedAccess`], typed `get_value` / `set_value` for
//!   booleans, integers, floats, strings, byte arrays and timestamps.  Reads
//!   never fail; a missing or corrupt value becomes the caller's default.

pub mod document;
pub mod error;
pub mod store;
pub mod typed;

pub use document::{Section, Sections};
pub use error::ConfigError;
pub use store::{ConfigStore, FlushOutcome, FlushPolicy, LoadPolicy, MemoryStore};
pub use typed::{ConfigValue, KeyValueStore, TypedAccess};

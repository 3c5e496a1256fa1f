//! Stores implementing [`crate::KeyValueStore`].
//!
//! - **`config_store`** – the real thing: a file-backed store with lazy
//!   loading, a dirty cache and a crash-safe diff-merge flush.
//! - **`memory`** – a file-less stand-in for tests.

pub mod config_store;
pub mod memory;

pub use config_store::{ConfigStore, FlushOutcome, FlushPolicy, LoadPolicy};
pub use memory::MemoryStore;

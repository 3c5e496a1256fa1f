//! In-memory [`KeyValueStore`] for tests and tooling.
//!
//! Behaves like a [`crate::ConfigStore`] that was loaded from `text` and never
//! flushes, including its refusal of unwritable entries and trimming of
//! values.  Collaborator code written against [`KeyValueStore`] can be
//! unit-tested with this instead of touching the file system.

use std::sync::{Mutex, PoisonError};

use crate::document::grammar::check_entry;
use crate::document::{parse_document, Sections};
use crate::error::ConfigError;
use crate::typed::KeyValueStore;

/// A thread-safe, file-less [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    sections: Mutex<Sections>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated by parsing settings-file text.
    pub fn from_text(text: &str) -> Self {
        Self {
            sections: Mutex::new(parse_document(text)),
        }
    }

    /// Copy of everything stored so far.
    pub fn snapshot(&self) -> Sections {
        self.sections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, section: &str, key: &str) -> Result<Option<String>, ConfigError> {
        let sections = self.sections.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(sections.get(section).and_then(|s| s.get(key)).cloned())
    }

    fn set_raw(&self, section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        check_entry(section, key, value)
            .map_err(|reason| ConfigError::invalid_entry(section, key, reason))?;
        let value = value.trim();
        let mut sections = self.sections.lock().unwrap_or_else(PoisonError::into_inner);
        sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_then_get() {
        // Arrange
        let store = MemoryStore::new();

        // Act
        store.set_raw("Text", "KphText", "km/h").unwrap();

        // Assert
        assert_eq!(store.get_raw("Text", "KphText").unwrap().as_deref(), Some("km/h"));
        assert_eq!(store.get_raw("Text", "MphText").unwrap(), None);
    }

    #[test]
    fn test_memory_store_from_text_applies_load_rules() {
        let store = MemoryStore::from_text("[Core]\nA=1\n[Core]\nB=2\n");
        assert_eq!(store.get_raw("Core", "A").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get_raw("Core", "B").unwrap(), None);
    }

    #[test]
    fn test_snapshot_reflects_writes_in_order() {
        let store = MemoryStore::new();
        store.set_raw("UI", "OffsetX", "0").unwrap();
        store.set_raw("Core", "UseMph", "False").unwrap();

        let names: Vec<String> = store.snapshot().keys().cloned().collect();
        assert_eq!(names, ["UI", "Core"]);
    }

    #[test]
    fn test_memory_store_refuses_what_a_file_could_not_hold() {
        let store = MemoryStore::new();

        let err = store.set_raw("Core", "A=B", "x").unwrap_err();

        assert!(matches!(err, ConfigError::InvalidEntry { .. }));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_memory_store_trims_values() {
        let store = MemoryStore::new();

        store.set_raw("Text", "MphText", " mph ").unwrap();

        assert_eq!(store.get_raw("Text", "MphText").unwrap().as_deref(), Some("mph"));
    }
}

//! The file-backed settings store.
//!
//! # Two caches (for beginners)
//!
//! The store keeps two maps of section → key → value:
//!
//! - **cache**: everything last read from the file plus every write made
//!   since.  All reads are answered from here.
//! - **dirty**: only the values written since the last successful flush.
//!   This is what the flush merges into the file.
//!
//! Writes go into both maps, so `dirty ⊆ cache` always holds.  A flush with
//! an empty dirty map does no I/O at all.
//!
//! # Locking
//!
//! One `std::sync::Mutex` guards both maps.  Every public operation holds it
//! from start to finish, including the file I/O of a load or flush, so
//! operations from the HUD thread and the background save worker are
//! totally ordered.  Each fallible step completes before any map is touched,
//! so a poisoned mutex is recovered rather than propagated.
//!
//! # Crash safety
//!
//! A flush writes the merged text to a temporary file in the same directory,
//! syncs it, and renames it over the backing file.  A crash before the
//! rename leaves the old file intact; the rename itself is atomic.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::document::grammar::check_entry;
use crate::document::merge::merge_document;
use crate::document::{entry_count, parse_document, Section, Sections};
use crate::error::ConfigError;
use crate::typed::KeyValueStore;

/// When the backing file is first parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Parse inside [`ConfigStore::open`].
    Eager,
    /// Parse on the first read or write.
    Lazy,
}

/// Whether every write is persisted immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Every [`ConfigStore::set`] flushes before returning.
    Immediate,
    /// Writes accumulate until [`ConfigStore::flush`] is called.
    Manual,
}

/// Result of a successful [`ConfigStore::flush`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was pending; the file was not touched.
    Clean,
    /// The file was rewritten with this many pending sections and keys.
    Written { sections: usize, keys: usize },
}

#[derive(Debug, Default)]
struct StoreState {
    loaded: bool,
    cache: Sections,
    dirty: Sections,
}

/// Thread-safe, lazily-loaded, diff-preserving INI store bound to one file.
///
/// # Examples
///
/// ```rust,no_run
/// use speedo_config::{ConfigStore, FlushPolicy, LoadPolicy, TypedAccess};
///
/// let store = ConfigStore::open("scripts/Metric_Speedometer.ini", LoadPolicy::Lazy, FlushPolicy::Manual)?;
/// let use_mph = store.get_value("Core", "UseMph", false);
/// store.set_value("Core", "DisplayMode", 2)?;
/// store.flush()?;
/// # let _ = use_mph;
/// # Ok::<(), speedo_config::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    flush_policy: FlushPolicy,
    state: Mutex<StoreState>,
}

impl ConfigStore {
    /// Binds a store to `path`.
    ///
    /// A missing file is not an error: the store starts empty and the file is
    /// created by the first flush.
    ///
    /// # Errors
    ///
    /// With [`LoadPolicy::Eager`], returns [`ConfigError::Io`] if the file
    /// exists but cannot be read.
    pub fn open(
        path: impl Into<PathBuf>,
        load: LoadPolicy,
        flush: FlushPolicy,
    ) -> Result<Self, ConfigError> {
        let store = Self {
            path: path.into(),
            flush_policy: flush,
            state: Mutex::new(StoreState::default()),
        };

        if load == LoadPolicy::Eager {
            let mut state = store.lock();
            store.load_locked(&mut state)?;
        }

        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Discards both caches and parses the backing file again.
    ///
    /// Writes that were not flushed are lost.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read; the
    /// caches are left as they were.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let mut state = self.lock();
        self.load_locked(&mut state)
    }

    /// Returns the value of `key` in `section`, or `None` if either is absent.
    ///
    /// # Errors
    ///
    /// Only a failing lazy first load can produce an error.
    pub fn get(&self, section: &str, key: &str) -> Result<Option<String>, ConfigError> {
        let mut state = self.lock();
        self.ensure_loaded(&mut state)?;
        Ok(state
            .cache
            .get(section)
            .and_then(|s| s.get(key))
            .cloned())
    }

    /// Writes `value` for `key` in `section`, creating either if needed.
    ///
    /// The value is stored trimmed, exactly as a reload would read it back.
    /// With [`FlushPolicy::Immediate`] the write is flushed before returning.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidEntry`] if the section, key or value cannot be
    /// written as a single readable line (nothing is written).  Otherwise a
    /// failing lazy first load (nothing is written), or a failing immediate
    /// flush (the write stays pending and a later flush retries it).
    pub fn set(&self, section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        check_entry(section, key, value)
            .map_err(|reason| ConfigError::invalid_entry(section, key, reason))?;
        let value = value.trim();

        let mut guard = self.lock();
        let state = &mut *guard;
        self.ensure_loaded(state)?;

        for sections in [&mut state.cache, &mut state.dirty] {
            sections
                .entry(section.to_string())
                .or_default()
                .insert(key.to_string(), value.to_string());
        }

        if self.flush_policy == FlushPolicy::Immediate {
            self.flush_locked(state)?;
        }
        Ok(())
    }

    /// Merges all pending writes into the backing file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if reading the current file, writing the
    /// temporary file or replacing the backing file fails.  Pending writes
    /// are kept so the flush can be retried.
    pub fn flush(&self) -> Result<FlushOutcome, ConfigError> {
        let mut state = self.lock();
        self.flush_locked(&mut state)
    }

    /// `true` if there are writes not yet flushed.
    pub fn is_dirty(&self) -> bool {
        !self.lock().dirty.is_empty()
    }

    /// Names of all known sections, in file order followed by new sections.
    ///
    /// # Errors
    ///
    /// Only a failing lazy first load can produce an error.
    pub fn sections(&self) -> Result<Vec<String>, ConfigError> {
        let mut state = self.lock();
        self.ensure_loaded(&mut state)?;
        Ok(state.cache.keys().cloned().collect())
    }

    /// Snapshot of one section's keys and values.
    ///
    /// # Errors
    ///
    /// Only a failing lazy first load can produce an error.
    pub fn section(&self, name: &str) -> Result<Option<Section>, ConfigError> {
        let mut state = self.lock();
        self.ensure_loaded(&mut state)?;
        Ok(state.cache.get(name).cloned())
    }

    // ── Internals (caller holds the lock) ─────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_loaded(&self, state: &mut StoreState) -> Result<(), ConfigError> {
        if state.loaded {
            return Ok(());
        }
        self.load_locked(state)
    }

    fn load_locked(&self, state: &mut StoreState) -> Result<(), ConfigError> {
        let sections = match read_if_exists(&self.path)? {
            Some(text) => parse_document(&text),
            None => {
                debug!("config {} does not exist; starting empty", self.path.display());
                Sections::new()
            }
        };

        debug!(
            "loaded {} sections ({} keys) from {}",
            sections.len(),
            entry_count(&sections),
            self.path.display()
        );
        state.cache = sections;
        state.dirty.clear();
        state.loaded = true;
        Ok(())
    }

    fn flush_locked(&self, state: &mut StoreState) -> Result<FlushOutcome, ConfigError> {
        if state.dirty.is_empty() {
            return Ok(FlushOutcome::Clean);
        }

        // Re-read rather than reuse the cache: unrelated lines and external
        // edits to keys we did not touch must survive.
        let original = read_if_exists(&self.path)?;
        let merged = merge_document(original.as_deref(), &state.dirty);
        replace_file(&self.path, merged.as_bytes())?;

        let outcome = FlushOutcome::Written {
            sections: state.dirty.len(),
            keys: entry_count(&state.dirty),
        };
        state.dirty.clear();
        info!("saved config {} ({outcome:?})", self.path.display());
        Ok(outcome)
    }
}

impl KeyValueStore for ConfigStore {
    fn get_raw(&self, section: &str, key: &str) -> Result<Option<String>, ConfigError> {
        self.get(section, key)
    }

    fn set_raw(&self, section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set(section, key, value)
    }
}

// ── File helpers ──────────────────────────────────────────────────────────────

/// Reads the whole file, mapping "not found" to `None`.
fn read_if_exists(path: &Path) -> Result<Option<String>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::io(path, e)),
    }
}

/// Atomically replaces `path` with `contents` via a synced same-directory
/// temp file.  The temp file is removed if any step before the rename fails.
fn replace_file(path: &Path, contents: &[u8]) -> Result<(), ConfigError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| ConfigError::io(&dir, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".speedo-")
        .suffix(".tmp")
        .tempfile_in(&dir)
        .map_err(|e| ConfigError::io(&dir, e))?;

    tmp.write_all(contents)
        .map_err(|e| ConfigError::io(tmp.path(), e))?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| ConfigError::io(tmp.path(), e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| ConfigError::io(tmp.path(), e))?;

    tmp.persist(path).map_err(|e| ConfigError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn write(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).expect("write fixture");
        path
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();

        // Act
        let store = ConfigStore::open(
            dir.path().join("absent.ini"),
            LoadPolicy::Eager,
            FlushPolicy::Manual,
        )
        .expect("missing file is not an error");

        // Assert
        assert_eq!(store.get("Core", "UseMph").unwrap(), None);
        assert!(store.sections().unwrap().is_empty());
    }

    #[test]
    fn test_eager_open_fails_when_path_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigStore::open(dir.path(), LoadPolicy::Eager, FlushPolicy::Manual);
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_lazy_open_defers_read_errors_to_first_access() {
        // Arrange – a directory cannot be read as a file
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path(), LoadPolicy::Lazy, FlushPolicy::Manual)
            .expect("lazy open performs no I/O");

        // Act
        let result = store.get("Core", "UseMph");

        // Assert
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_lazy_store_does_not_read_until_first_access() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.ini");
        let store = ConfigStore::open(&path, LoadPolicy::Lazy, FlushPolicy::Manual).unwrap();

        // Act – the file appears after construction but before the first get
        fs::write(&path, "[Core]\nUseMph=True\n").unwrap();

        // Assert
        assert_eq!(store.get("Core", "UseMph").unwrap().as_deref(), Some("True"));
    }

    #[test]
    fn test_set_updates_cache_and_marks_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path().join("a.ini"), LoadPolicy::Lazy, FlushPolicy::Manual)
            .unwrap();

        store.set("Core", "DisplayMode", "2").unwrap();

        assert_eq!(store.get("Core", "DisplayMode").unwrap().as_deref(), Some("2"));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_refused_set_leaves_store_untouched() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.ini");
        let store = ConfigStore::open(&path, LoadPolicy::Lazy, FlushPolicy::Immediate).unwrap();

        // Act
        let result = store.set("Core", "UseMph\nDisplayMode", "2");

        // Assert
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEntry { reason: "key contains a line break", .. })
        ));
        assert!(!store.is_dirty());
        assert!(!path.exists(), "an immediate store must not flush a refused write");
    }

    #[test]
    fn test_flush_writes_merge_and_clears_dirty() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "s.ini", "[Core]\nUseMph=False\n");
        let store = ConfigStore::open(&path, LoadPolicy::Eager, FlushPolicy::Manual).unwrap();
        store.set("Core", "DisplayMode", "2").unwrap();

        // Act
        let outcome = store.flush().unwrap();

        // Assert
        assert_eq!(outcome, FlushOutcome::Written { sections: 1, keys: 1 });
        assert!(!store.is_dirty());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[Core]\nUseMph=False\nDisplayMode=2\n"
        );
    }

    #[test]
    fn test_flush_with_nothing_pending_does_no_io() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.ini");
        let store = ConfigStore::open(&path, LoadPolicy::Lazy, FlushPolicy::Manual).unwrap();

        // Act
        let outcome = store.flush().unwrap();

        // Assert – no file was created
        assert_eq!(outcome, FlushOutcome::Clean);
        assert!(!path.exists());
    }

    #[test]
    fn test_immediate_policy_flushes_on_every_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auto.ini");
        let store = ConfigStore::open(&path, LoadPolicy::Lazy, FlushPolicy::Immediate).unwrap();

        store.set("Core", "UseMph", "True").unwrap();

        assert!(!store.is_dirty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[Core]\nUseMph=True\n");
    }

    #[test]
    fn test_flush_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scripts").join("Metric_Speedometer.ini");
        let store = ConfigStore::open(&path, LoadPolicy::Lazy, FlushPolicy::Manual).unwrap();

        store.set("Core", "UseMph", "False").unwrap();
        store.flush().unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_failed_flush_keeps_pending_writes() {
        // Arrange – load succeeds while "sub" does not exist yet
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(
            dir.path().join("sub").join("s.ini"),
            LoadPolicy::Eager,
            FlushPolicy::Manual,
        )
        .unwrap();
        store.set("Core", "UseMph", "True").unwrap();
        // ...then "sub" turns into a regular file, so nothing can be written under it
        write(&dir, "sub", "not a directory");

        // Act
        let result = store.flush();

        // Assert
        assert!(result.is_err());
        assert!(store.is_dirty(), "pending writes must survive a failed flush");
        assert_eq!(store.get("Core", "UseMph").unwrap().as_deref(), Some("True"));
    }

    #[test]
    fn test_reload_discards_unflushed_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "s.ini", "[Core]\nUseMph=False\n");
        let store = ConfigStore::open(&path, LoadPolicy::Eager, FlushPolicy::Manual).unwrap();
        store.set("Core", "UseMph", "True").unwrap();

        store.reload().unwrap();

        assert_eq!(store.get("Core", "UseMph").unwrap().as_deref(), Some("False"));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_flush_keeps_external_edits_to_untouched_keys() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "s.ini", "[Core]\nUseMph=False\nRainbowMode=0\n");
        let store = ConfigStore::open(&path, LoadPolicy::Eager, FlushPolicy::Manual).unwrap();
        store.set("Core", "UseMph", "True").unwrap();

        // Act – someone edits another key between load and flush
        fs::write(&path, "[Core]\nUseMph=False\nRainbowMode=3\n").unwrap();
        store.flush().unwrap();

        // Assert
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[Core]\nUseMph=True\nRainbowMode=3\n"
        );
    }

    #[test]
    fn test_section_snapshot_and_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "s.ini", "[Core]\nA=1\n[UI]\nB=2\n");
        let store = ConfigStore::open(&path, LoadPolicy::Lazy, FlushPolicy::Manual).unwrap();
        store.set("Stats", "DistanceKm", "0").unwrap();

        assert_eq!(store.sections().unwrap(), ["Core", "UI", "Stats"]);
        let core = store.section("Core").unwrap().expect("Core exists");
        assert_eq!(core.get("A").map(String::as_str), Some("1"));
        assert!(store.section("Missing").unwrap().is_none());
    }

    #[test]
    fn test_concurrent_sets_are_all_persisted() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("threads.ini");
        let store = Arc::new(
            ConfigStore::open(&path, LoadPolicy::Lazy, FlushPolicy::Manual).unwrap(),
        );

        // Act – several writers, each also flushing
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = Arc::clone(&store);
                thread::spawn(move || {
                    for j in 0..20 {
                        s.set(&format!("T{i}"), &format!("K{j}"), &j.to_string())
                            .expect("set");
                    }
                    s.flush().expect("flush");
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread panicked");
        }

        // Assert – a fresh store sees every value
        let fresh = ConfigStore::open(&path, LoadPolicy::Eager, FlushPolicy::Manual).unwrap();
        for i in 0..8 {
            for j in 0..20 {
                assert_eq!(
                    fresh.get(&format!("T{i}"), &format!("K{j}")).unwrap(),
                    Some(j.to_string())
                );
            }
        }
    }
}

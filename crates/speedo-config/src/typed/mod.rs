//! Typed access layered over the string-only store interface.
//!
//! [`KeyValueStore`] is the narrow seam: anything that can get and set raw
//! strings by section and key.  [`TypedAccess`] is blanket-implemented for
//! every such store and adds `get_value` / `set_value` for any
//! [`ConfigValue`] type.
//!
//! The read side never fails.  An absent key, unparsable text or even a
//! failed lazy load all produce the caller's default; the last two are
//! logged at `warn` so a broken settings file is still visible.

use tracing::warn;

use crate::error::ConfigError;

pub mod value;

pub use value::ConfigValue;

/// String-level access to a sectioned key/value store.
pub trait KeyValueStore {
    /// Raw value of `key` in `section`, `None` if absent.
    fn get_raw(&self, section: &str, key: &str) -> Result<Option<String>, ConfigError>;

    /// Writes the raw value of `key` in `section`.
    fn set_raw(&self, section: &str, key: &str, value: &str) -> Result<(), ConfigError>;
}

/// Typed getters and setters for every [`KeyValueStore`].
pub trait TypedAccess: KeyValueStore {
    /// Reads `key` as `T`, falling back to `default` on any failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use speedo_config::{MemoryStore, TypedAccess};
    ///
    /// let store = MemoryStore::from_text("[Core]\nUseMph=False\nDisplayMode=oops\n");
    /// assert!(!store.get_value("Core", "UseMph", true));
    /// assert_eq!(store.get_value("Core", "DisplayMode", 1), 1);
    /// assert_eq!(store.get_value("Core", "Missing", 7_i64), 7);
    /// ```
    fn get_value<T: ConfigValue>(&self, section: &str, key: &str, default: T) -> T {
        match self.get_raw(section, key) {
            Ok(Some(raw)) => T::from_config_str(&raw).unwrap_or_else(|| {
                warn!(
                    "[{section}] {key}={raw:?} is not a valid {}; using default",
                    T::TYPE_NAME
                );
                default
            }),
            Ok(None) => default,
            Err(e) => {
                warn!("could not read [{section}] {key}: {e}; using default");
                default
            }
        }
    }

    /// Writes `value` in its canonical text form.
    ///
    /// # Errors
    ///
    /// Propagates the store's [`ConfigError`] (lazy load or immediate flush).
    fn set_value<T: ConfigValue>(&self, section: &str, key: &str, value: T) -> Result<(), ConfigError> {
        self.set_raw(section, key, &value.to_config_string())
    }

    /// Raw string value, `None` if absent or unreadable.
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.get_raw(section, key).ok().flatten()
    }
}

impl<S: KeyValueStore + ?Sized> TypedAccess for S {}

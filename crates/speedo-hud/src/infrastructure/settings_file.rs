//! Opening the HUD settings file.
//!
//! The HUD script reads its settings from `scripts/Metric_Speedometer.ini`
//! relative to the game directory.  Tools open it lazily with manual flush:
//! nothing is read until the first access, and each command decides when
//! its changes hit the disk.

use std::path::Path;

use speedo_config::{ConfigError, ConfigStore, FlushPolicy, LoadPolicy};
use tracing::debug;

/// Where the settings file lives relative to the game directory.
pub const DEFAULT_SETTINGS_PATH: &str = "scripts/Metric_Speedometer.ini";

/// Opens the settings store at `path` (lazy load, manual flush).
///
/// # Errors
///
/// Never fails for a lazy store today; the `Result` leaves room for an
/// eager policy.
pub fn open_settings(path: &Path) -> Result<ConfigStore, ConfigError> {
    debug!("opening settings file {}", path.display());
    ConfigStore::open(path, LoadPolicy::Lazy, FlushPolicy::Manual)
}

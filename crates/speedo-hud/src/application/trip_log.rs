//! Trip odometer snapshots.
//!
//! The HUD accumulates distance while driving and snapshots it to the
//! `[Stats]` section when the game pauses.  The snapshot runs on its own
//! thread so the caller never waits on disk I/O; the store's single mutex
//! keeps it consistent with any reads and writes happening meanwhile.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Utc};
use speedo_config::{
    ConfigError, ConfigStore, ConfigValue, FlushOutcome, KeyValueStore, TypedAccess,
};
use tracing::{debug, info};

pub const STATS: &str = "Stats";

/// Accumulated trip distance and when it was last snapshotted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TripStats {
    pub distance_km: f64,
    pub saved_at: Option<DateTime<Utc>>,
}

impl TripStats {
    /// Reads `[Stats]`.  A negative or non-finite distance reads as zero.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let distance_km = store.get_value(STATS, "DistanceKm", 0.0_f64);
        let saved_at = store
            .get_string(STATS, "SavedAt")
            .and_then(|raw| DateTime::<Utc>::from_config_str(&raw));
        Self {
            distance_km: sanitize(distance_km),
            saved_at,
        }
    }

    /// Writes `[Stats]` without flushing.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<(), ConfigError> {
        store.set_value(STATS, "DistanceKm", self.distance_km)?;
        if let Some(saved_at) = self.saved_at {
            store.set_value(STATS, "SavedAt", saved_at)?;
        }
        Ok(())
    }

    /// Adds driven distance.  Negative or non-finite amounts are ignored.
    pub fn add_km(&mut self, km: f64) {
        if km.is_finite() && km > 0.0 {
            self.distance_km += km;
        }
    }

    pub fn reset(&mut self) {
        self.distance_km = 0.0;
    }
}

fn sanitize(km: f64) -> f64 {
    if km.is_finite() && km > 0.0 {
        km
    } else {
        0.0
    }
}

/// Stamps `stats` with the current time, writes it and flushes the store on
/// a spawned thread.
///
/// Joining the handle yields the flush result.  Foreground code may keep
/// using `store` while the snapshot runs.
pub fn save_in_background(
    store: Arc<ConfigStore>,
    stats: TripStats,
) -> JoinHandle<Result<FlushOutcome, ConfigError>> {
    thread::spawn(move || {
        let stamped = TripStats {
            saved_at: Some(Utc::now()),
            ..stats
        };
        debug!("trip snapshot: {:.3} km", stamped.distance_km);
        stamped.save(&*store)?;
        let outcome = store.flush()?;
        info!(
            "trip snapshot saved to {}: {:?}",
            store.path().display(),
            outcome
        );
        Ok(outcome)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use speedo_config::{FlushPolicy, LoadPolicy, MemoryStore};

    fn temp_store(dir: &tempfile::TempDir, text: &str) -> Arc<ConfigStore> {
        let path = dir.path().join("Metric_Speedometer.ini");
        std::fs::write(&path, text).unwrap();
        Arc::new(ConfigStore::open(&path, LoadPolicy::Lazy, FlushPolicy::Manual).unwrap())
    }

    // ── TripStats ─────────────────────────────────────────────────────────────

    #[test]
    fn test_load_without_stats_section_is_zero() {
        let stats = TripStats::load(&MemoryStore::from_text("[Core]\nUseMph=False\n"));

        assert_eq!(stats, TripStats::default());
    }

    #[test]
    fn test_load_clamps_bad_distance_to_zero() {
        assert_eq!(
            TripStats::load(&MemoryStore::from_text("[Stats]\nDistanceKm=-4\n")).distance_km,
            0.0
        );
        assert_eq!(
            TripStats::load(&MemoryStore::from_text("[Stats]\nDistanceKm=NaN\n")).distance_km,
            0.0
        );
    }

    #[test]
    fn test_load_ignores_unparsable_timestamp() {
        let store = MemoryStore::from_text("[Stats]\nDistanceKm=3.5\nSavedAt=yesterday\n");

        let stats = TripStats::load(&store);

        assert_eq!(stats.distance_km, 3.5);
        assert_eq!(stats.saved_at, None);
    }

    #[test]
    fn test_add_km_ignores_negative_and_non_finite() {
        let mut stats = TripStats::default();

        stats.add_km(1.5);
        stats.add_km(-3.0);
        stats.add_km(f64::INFINITY);
        stats.add_km(f64::NAN);

        assert_eq!(stats.distance_km, 1.5);
    }

    #[test]
    fn test_reset_zeroes_distance() {
        let mut stats = TripStats {
            distance_km: 42.0,
            saved_at: None,
        };

        stats.reset();

        assert_eq!(stats.distance_km, 0.0);
    }

    // ── Background snapshot ───────────────────────────────────────────────────

    #[test]
    fn test_save_in_background_writes_and_stamps() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir, "[Core]\nUseMph=False\n");
        let before = Utc::now();

        // Act
        let outcome = save_in_background(
            Arc::clone(&store),
            TripStats {
                distance_km: 12.5,
                saved_at: None,
            },
        )
        .join()
        .unwrap()
        .unwrap();

        // Assert
        assert!(matches!(outcome, FlushOutcome::Written { .. }));
        let fresh = ConfigStore::open(store.path(), LoadPolicy::Eager, FlushPolicy::Manual).unwrap();
        let loaded = TripStats::load(&fresh);
        assert_eq!(loaded.distance_km, 12.5);
        assert!(loaded.saved_at.unwrap() >= before);
    }

    #[test]
    fn test_snapshot_runs_concurrently_with_foreground_writes() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir, "[Core]\nDisplayMode=1\n");

        // Act – foreground edits race the snapshot thread
        let handle = save_in_background(
            Arc::clone(&store),
            TripStats {
                distance_km: 7.25,
                saved_at: None,
            },
        );
        for mode in 0..50 {
            store.set_value("Core", "DisplayMode", mode % 3).unwrap();
        }
        handle.join().unwrap().unwrap();
        store.flush().unwrap();

        // Assert – both writers' values are in the file
        let fresh = ConfigStore::open(store.path(), LoadPolicy::Eager, FlushPolicy::Manual).unwrap();
        assert_eq!(fresh.get_value("Core", "DisplayMode", -1), 49 % 3);
        assert_eq!(TripStats::load(&fresh).distance_km, 7.25);
        assert!(!store.is_dirty());
    }
}

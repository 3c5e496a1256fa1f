//! `speedo`: command-line editor for the speedometer HUD settings file.
//!
//! Reads and edits `Metric_Speedometer.ini` the same way the HUD does: every
//! value is typed, missing or corrupt values fall back to their defaults, and
//! writes rewrite only the lines that changed, leaving comments and unknown
//! keys alone.
//!
//! # Usage
//!
//! ```text
//! speedo [OPTIONS] <COMMAND>
//!
//! Commands:
//!   show            Print the effective settings and the trip distance
//!   get             Print one raw value
//!   set             Write one raw value
//!   mode            Set the display mode (off, simple, detailed)
//!   units           Set the speed unit (kmh, mph)
//!   nudge           Offset the panel or text colour
//!   reset-display   Restore the layout, colour and label defaults
//!   trip            Show, reset or add to the trip odometer
//!
//! Options:
//!   --config <PATH>  Settings file [default: scripts/Metric_Speedometer.ini]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable        | Default                           | Description   |
//! |-----------------|-----------------------------------|---------------|
//! | `SPEEDO_CONFIG` | `scripts/Metric_Speedometer.ini`  | Settings file |
//! | `RUST_LOG`      | `warn`                            | Log filter    |
//!
//! # Architecture overview
//!
//! ```text
//! speedo (this binary)
//!   domain/          HudSettings, Argb, units
//!   application/     edit_settings, trip_log
//!   infrastructure/  settings file location
//!       ↕
//! speedo-config      ConfigStore (lazy load, diff-merge flush)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use speedo_config::{ConfigStore, FlushOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

use speedo_hud::application::edit_settings::{apply_edit, ColorTarget, SettingsEdit};
use speedo_hud::application::trip_log::{save_in_background, TripStats};
use speedo_hud::domain::units::format_odometer;
use speedo_hud::domain::{HudSettings, SpeedUnit, SpeedoMode};
use speedo_hud::infrastructure::{open_settings, DEFAULT_SETTINGS_PATH};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Speedometer HUD settings tool.
#[derive(Debug, Parser)]
#[command(
    name = "speedo",
    about = "Inspect and edit the speedometer HUD settings file",
    version
)]
struct Cli {
    /// Path of the settings file.
    #[arg(long, default_value = DEFAULT_SETTINGS_PATH, env = "SPEEDO_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the effective settings (defaults filled in) and the trip distance.
    Show,

    /// Print the raw value of KEY in SECTION; exits with status 1 if absent.
    Get { section: String, key: String },

    /// Write a raw value.
    Set {
        section: String,
        key: String,
        value: String,
    },

    /// Set the display mode: off, simple or detailed.
    Mode { mode: SpeedoMode },

    /// Set the speed unit: kmh or mph.
    Units { unit: SpeedUnit },

    /// Offset the back (panel) or fore (text) colour; channels saturate.
    Nudge {
        target: ColorTarget,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        alpha: i32,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        red: i32,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        green: i32,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        blue: i32,
    },

    /// Restore the `[UI]` and `[Text]` defaults.
    ResetDisplay,

    /// Show the trip odometer, or reset it / add distance to it.
    Trip {
        /// Zero the trip distance (applied before --add-km).
        #[arg(long)]
        reset: bool,
        /// Kilometres to add.
        #[arg(long)]
        add_km: Option<f64>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// Each command opens the store lazily, does its reads and writes, and
/// flushes at most once, so a command produces at most one rewrite.
fn main() -> anyhow::Result<ExitCode> {
    // `RUST_LOG` overrides the filter; warnings (corrupt values, fallbacks)
    // are shown by default.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = open_settings(&cli.config)
        .with_context(|| format!("cannot open settings file {}", cli.config.display()))?;

    match cli.command {
        Command::Show => {
            let settings = HudSettings::load(&store);
            let trip = TripStats::load(&store);
            println!("{}", settings_toml(&settings)?);
            println!(
                "# Speed shown in {}; trip: {}",
                settings.speed_label(),
                format_odometer(trip.distance_km, settings.speed_unit())
            );
        }
        Command::Get { section, key } => match store.get(&section, &key)? {
            Some(value) => println!("{value}"),
            None => {
                eprintln!("[{section}] {key} is not set");
                return Ok(ExitCode::from(1));
            }
        },
        Command::Set {
            section,
            key,
            value,
        } => {
            store.set(&section, &key, &value)?;
            flush(&store)?;
        }
        Command::Trip { reset, add_km } => {
            let unit = HudSettings::load(&store).speed_unit();
            let mut trip = TripStats::load(&store);
            if reset || add_km.is_some() {
                if reset {
                    trip.reset();
                }
                if let Some(km) = add_km {
                    trip.add_km(km);
                }
                let outcome = save_in_background(Arc::new(store), trip)
                    .join()
                    .map_err(|_| anyhow!("trip snapshot thread panicked"))??;
                info!("trip snapshot: {outcome:?}");
            }
            println!("{}", format_odometer(trip.distance_km, unit));
        }
        Command::Mode { mode } => run_edit(&store, SettingsEdit::Mode(mode))?,
        Command::Units { unit } => run_edit(&store, SettingsEdit::Units(unit))?,
        Command::Nudge {
            target,
            alpha,
            red,
            green,
            blue,
        } => run_edit(
            &store,
            SettingsEdit::Nudge {
                target,
                da: alpha,
                dr: red,
                dg: green,
                db: blue,
            },
        )?,
        Command::ResetDisplay => run_edit(&store, SettingsEdit::ResetDisplay)?,
    }

    Ok(ExitCode::SUCCESS)
}

/// Applies one settings edit, flushes, and prints the resulting settings.
fn run_edit(store: &ConfigStore, edit: SettingsEdit) -> anyhow::Result<()> {
    let settings = apply_edit(store, &edit)?;
    flush(store)?;
    println!("{}", settings_toml(&settings)?);
    Ok(())
}

fn flush(store: &ConfigStore) -> anyhow::Result<()> {
    match store.flush()? {
        FlushOutcome::Clean => info!("{}: nothing to write", store.path().display()),
        FlushOutcome::Written { sections, keys } => info!(
            "{}: wrote {keys} key(s) in {sections} section(s)",
            store.path().display()
        ),
    }
    Ok(())
}

fn settings_toml(settings: &HudSettings) -> anyhow::Result<String> {
    toml::to_string_pretty(settings).context("failed to render settings as TOML")
}

//! EditSettingsUseCase: applies one user-facing settings change.
//!
//! Each edit loads the current [`HudSettings`] from the store, changes the
//! relevant fields and saves the whole set back.  Unchanged fields are
//! rewritten with identical text, so the file only changes where a value did.

use std::str::FromStr;

use speedo_config::KeyValueStore;
use tracing::debug;

use crate::domain::{HudSettings, SpeedUnit, SpeedoMode};
use crate::error::SettingsError;

/// Which of the two panel colours an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    /// The panel background (`Backcolor*`).
    Back,
    /// The text (`Forecolor*`).
    Fore,
}

impl FromStr for ColorTarget {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "back" | "backcolor" => Ok(Self::Back),
            "fore" | "forecolor" => Ok(Self::Fore),
            _ => Err(SettingsError::UnknownVariant {
                key: "color target",
                value: s.to_string(),
            }),
        }
    }
}

/// A single settings change.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEdit {
    Mode(SpeedoMode),
    Units(SpeedUnit),
    /// Offset a colour's channels, saturating at 0 and 255.
    Nudge {
        target: ColorTarget,
        da: i32,
        dr: i32,
        dg: i32,
        db: i32,
    },
    /// Restore the `[UI]` and `[Text]` defaults.
    ResetDisplay,
}

/// Applies `edit` to the settings held in `store` and returns the result.
///
/// # Errors
///
/// Returns [`SettingsError::Config`] if the store rejects a write.
pub fn apply_edit<S: KeyValueStore + ?Sized>(
    store: &S,
    edit: &SettingsEdit,
) -> Result<HudSettings, SettingsError> {
    let mut settings = HudSettings::load(store);
    match *edit {
        SettingsEdit::Mode(mode) => settings.core.display_mode = mode,
        SettingsEdit::Units(unit) => settings.core.use_mph = unit.is_mph(),
        SettingsEdit::Nudge {
            target,
            da,
            dr,
            dg,
            db,
        } => {
            let color = match target {
                ColorTarget::Back => &mut settings.ui.backcolor,
                ColorTarget::Fore => &mut settings.ui.forecolor,
            };
            *color = color.offset(da, dr, dg, db);
        }
        SettingsEdit::ResetDisplay => settings.reset_display(),
    }
    debug!("applying settings edit {edit:?}");
    settings.save(store)?;
    Ok(settings)
}

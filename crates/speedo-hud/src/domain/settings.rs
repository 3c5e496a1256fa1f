//! The HUD settings schema: every persisted field, its section, key and
//! default.
//!
//! # How settings are stored (for beginners)
//!
//! The settings file has three sections:
//!
//! ```text
//! [Core]   behaviour: units, display mode, menu key, saving, rainbow mode
//! [UI]     placement, panel size, font and the two panel colours
//! [Text]   the speed labels shown for km/h and mph
//! ```
//!
//! [`HudSettings::load`] reads each field independently through
//! [`TypedAccess::get_value`], so a missing or corrupt line only resets that
//! one field.  [`HudSettings::save`] writes the fields back; unchanged
//! values are rewritten with the same text, so the file only changes where a
//! value did.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use speedo_config::{ConfigError, ConfigValue, KeyValueStore, TypedAccess};

use super::color::Argb;
use super::units::SpeedUnit;
use crate::error::SettingsError;

pub const CORE: &str = "Core";
pub const UI: &str = "UI";
pub const TEXT: &str = "Text";

// ── Enumerated settings ───────────────────────────────────────────────────────

/// How much the HUD shows.  Persisted as its integer discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SpeedoMode {
    Off = 0,
    #[default]
    Simple = 1,
    Detailed = 2,
}

impl SpeedoMode {
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Off),
            1 => Some(Self::Simple),
            2 => Some(Self::Detailed),
            _ => None,
        }
    }

    pub fn index(self) -> i32 {
        self as i32
    }
}

impl ConfigValue for SpeedoMode {
    const TYPE_NAME: &'static str = "SpeedoMode";

    fn to_config_string(&self) -> String {
        self.index().to_string()
    }

    fn from_config_str(raw: &str) -> Option<Self> {
        i32::from_config_str(raw).and_then(Self::from_index)
    }
}

impl FromStr for SpeedoMode {
    type Err = SettingsError;

    /// Accepts a mode name in any case, or its number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "simple" => Ok(Self::Simple),
            "detailed" => Ok(Self::Detailed),
            _ => Self::from_config_str(trimmed).ok_or_else(|| SettingsError::UnknownVariant {
                key: "DisplayMode",
                value: s.to_string(),
            }),
        }
    }
}

/// Declares an enum persisted by variant name; parsing ignores case.
macro_rules! named_setting {
    ($(#[$meta:meta])* $name:ident, key = $key:literal, default = $default:ident, [$($variant:ident),+]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = SettingsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| SettingsError::UnknownVariant {
                        key: $key,
                        value: s.to_string(),
                    })
            }
        }

        impl ConfigValue for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn to_config_string(&self) -> String {
                self.name().to_string()
            }

            fn from_config_str(raw: &str) -> Option<Self> {
                raw.parse().ok()
            }
        }
    };
}

named_setting!(
    /// Vertical anchoring of the HUD panel.
    VerticalAlignment, key = "VertAlign", default = Bottom, [Top, Center, Bottom]
);

named_setting!(
    /// Horizontal anchoring of the HUD panel.
    HorizontalAlign, key = "HorzAlign", default = Center, [Left, Center, Right]
);

// ── Settings groups ───────────────────────────────────────────────────────────

/// `[Core]`: behaviour switches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CoreSettings {
    pub use_mph: bool,
    pub display_mode: SpeedoMode,
    pub enable_menu: bool,
    pub menu_key: String,
    pub enable_saving: bool,
    /// Colour-cycle speed index; 0 is off.
    pub rainbow_mode: i32,
    pub onfoot_speedo: bool,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            use_mph: false,
            display_mode: SpeedoMode::Simple,
            enable_menu: true,
            menu_key: "F6".to_string(),
            enable_saving: true,
            rainbow_mode: 0,
            onfoot_speedo: false,
        }
    }
}

/// `[UI]`: placement, size, font and colours.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UiSettings {
    pub vert_align: VerticalAlignment,
    pub horz_align: HorizontalAlign,
    pub offset_x: i32,
    pub offset_y: i32,
    pub panel_width: i32,
    pub panel_height: i32,
    pub font_size: f32,
    pub font_style: i32,
    // Colours last: they serialize as sub-tables.
    pub backcolor: Argb,
    pub forecolor: Argb,
}

pub const DEFAULT_BACKCOLOR: Argb = Argb::new(150, 237, 239, 241);
pub const DEFAULT_FORECOLOR: Argb = Argb::new(255, 0, 0, 0);

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            vert_align: VerticalAlignment::default(),
            horz_align: HorizontalAlign::default(),
            offset_x: 0,
            offset_y: 0,
            panel_width: 66,
            panel_height: 24,
            font_size: 0.5,
            font_style: 4,
            backcolor: DEFAULT_BACKCOLOR,
            forecolor: DEFAULT_FORECOLOR,
        }
    }
}

/// `[Text]`: speed labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextSettings {
    pub kph_text: String,
    pub mph_text: String,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            kph_text: "km/h".to_string(),
            mph_text: "mph".to_string(),
        }
    }
}

/// The complete persisted HUD configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HudSettings {
    #[serde(rename = "Core")]
    pub core: CoreSettings,
    #[serde(rename = "UI")]
    pub ui: UiSettings,
    #[serde(rename = "Text")]
    pub text: TextSettings,
}

// ── Load / save ───────────────────────────────────────────────────────────────

impl HudSettings {
    /// Reads every field from `store`, defaulting each one independently.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let d = Self::default();
        let core = CoreSettings {
            use_mph: store.get_value(CORE, "UseMph", d.core.use_mph),
            display_mode: store.get_value(CORE, "DisplayMode", d.core.display_mode),
            enable_menu: store.get_value(CORE, "EnableMenu", d.core.enable_menu),
            menu_key: store.get_value(CORE, "MenuKey", d.core.menu_key),
            enable_saving: store.get_value(CORE, "EnableSaving", d.core.enable_saving),
            rainbow_mode: store.get_value(CORE, "RainbowMode", d.core.rainbow_mode),
            onfoot_speedo: store.get_value(CORE, "OnfootSpeedo", d.core.onfoot_speedo),
        };
        let ui = UiSettings {
            vert_align: store.get_value(UI, "VertAlign", d.ui.vert_align),
            horz_align: store.get_value(UI, "HorzAlign", d.ui.horz_align),
            offset_x: store.get_value(UI, "OffsetX", d.ui.offset_x),
            offset_y: store.get_value(UI, "OffsetY", d.ui.offset_y),
            panel_width: store.get_value(UI, "PanelWidth", d.ui.panel_width),
            panel_height: store.get_value(UI, "PanelHeight", d.ui.panel_height),
            font_size: store.get_value(UI, "FontSize", d.ui.font_size),
            font_style: store.get_value(UI, "FontStyle", d.ui.font_style),
            backcolor: load_color(store, "Backcolor", d.ui.backcolor),
            forecolor: load_color(store, "Forecolor", d.ui.forecolor),
        };
        let text = TextSettings {
            kph_text: store.get_value(TEXT, "KphText", d.text.kph_text),
            mph_text: store.get_value(TEXT, "MphText", d.text.mph_text),
        };
        Self { core, ui, text }
    }

    /// Writes every field to `store` except `EnableMenu` and `MenuKey`, which
    /// are only ever hand-edited and so are left as the file has them.
    ///
    /// # Errors
    ///
    /// Returns the first store error; fields after it are not written.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<(), ConfigError> {
        let c = &self.core;
        store.set_value(CORE, "UseMph", c.use_mph)?;
        store.set_value(CORE, "DisplayMode", c.display_mode)?;
        store.set_value(CORE, "EnableSaving", c.enable_saving)?;
        store.set_value(CORE, "RainbowMode", c.rainbow_mode)?;
        store.set_value(CORE, "OnfootSpeedo", c.onfoot_speedo)?;

        let u = &self.ui;
        store.set_value(UI, "VertAlign", u.vert_align)?;
        store.set_value(UI, "HorzAlign", u.horz_align)?;
        store.set_value(UI, "OffsetX", u.offset_x)?;
        store.set_value(UI, "OffsetY", u.offset_y)?;
        store.set_value(UI, "PanelWidth", u.panel_width)?;
        store.set_value(UI, "PanelHeight", u.panel_height)?;
        store.set_value(UI, "FontSize", u.font_size)?;
        store.set_value(UI, "FontStyle", u.font_style)?;
        save_color(store, "Backcolor", u.backcolor)?;
        save_color(store, "Forecolor", u.forecolor)?;

        store.set_value(TEXT, "KphText", self.text.kph_text.clone())?;
        store.set_value(TEXT, "MphText", self.text.mph_text.clone())?;
        Ok(())
    }

    /// Restores the `[UI]` and `[Text]` defaults, keeping `[Core]` choices.
    pub fn reset_display(&mut self) {
        self.ui = UiSettings::default();
        self.text = TextSettings::default();
    }

    pub fn speed_unit(&self) -> SpeedUnit {
        SpeedUnit::from_use_mph(self.core.use_mph)
    }

    /// The speed label for the configured unit.
    pub fn speed_label(&self) -> &str {
        self.speed_unit()
            .speed_label(&self.text.kph_text, &self.text.mph_text)
    }
}

fn load_color<S: KeyValueStore + ?Sized>(store: &S, prefix: &str, default: Argb) -> Argb {
    let channel = |suffix: &str, fallback: u8| -> i32 {
        store.get_value(UI, &format!("{prefix}{suffix}"), i32::from(fallback))
    };
    Argb::from_clamped(
        channel("A", default.a),
        channel("R", default.r),
        channel("G", default.g),
        channel("B", default.b),
    )
}

fn save_color<S: KeyValueStore + ?Sized>(
    store: &S,
    prefix: &str,
    color: Argb,
) -> Result<(), ConfigError> {
    for (suffix, value) in [("A", color.a), ("R", color.r), ("G", color.g), ("B", color.b)] {
        store.set_value(UI, &format!("{prefix}{suffix}"), i32::from(value))?;
    }
    Ok(())
}

//! Domain types for the speedometer HUD.
//!
//! Pure data and conversions; nothing here touches the file system.
//!
//! - **`settings`** – [`HudSettings`] and its enumerated fields, with
//!   load/save against any [`speedo_config::KeyValueStore`].
//! - **`color`**    – [`Argb`] and saturating channel offsets.
//! - **`units`**    – m/s → km/h → mph conversions and display formatting.

pub mod color;
pub mod settings;
pub mod units;

pub use color::Argb;
pub use settings::{
    CoreSettings, HorizontalAlign, HudSettings, SpeedoMode, TextSettings, UiSettings,
    VerticalAlignment,
};
pub use units::SpeedUnit;

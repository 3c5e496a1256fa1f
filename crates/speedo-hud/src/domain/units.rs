//! Speed and distance unit conversions plus the labels shown next to them.
//!
//! The HUD receives speed in metres per second and accumulates distance in
//! kilometres; imperial users see both converted to miles.

use std::str::FromStr;

use serde::Serialize;

use crate::error::SettingsError;

/// Kilometres to statute miles, the factor the odometer has always used.
pub const KM_TO_MILES: f64 = 0.6213711916666667;

/// Converts a speed in m/s to km/h.
pub fn ms_to_kmh(m_per_s: f64) -> f64 {
    m_per_s * 3.6
}

/// Converts kilometres to miles.
pub fn km_to_miles(km: f64) -> f64 {
    km * KM_TO_MILES
}

/// The unit system the HUD displays in, selected by `[Core] UseMph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpeedUnit {
    Kmh,
    Mph,
}

impl SpeedUnit {
    pub fn from_use_mph(use_mph: bool) -> Self {
        if use_mph {
            Self::Mph
        } else {
            Self::Kmh
        }
    }

    pub fn is_mph(self) -> bool {
        self == Self::Mph
    }

    /// Picks the configured speed label (`[Text] KphText` / `MphText`).
    pub fn speed_label<'a>(self, kph_text: &'a str, mph_text: &'a str) -> &'a str {
        match self {
            Self::Kmh => kph_text,
            Self::Mph => mph_text,
        }
    }

    /// Short distance suffix used by the odometer.
    pub fn distance_label(self) -> &'static str {
        match self {
            Self::Kmh => "km",
            Self::Mph => "mi",
        }
    }

    /// Converts a distance in km to this unit.
    pub fn distance_from_km(self, km: f64) -> f64 {
        match self {
            Self::Kmh => km,
            Self::Mph => km_to_miles(km),
        }
    }
}

impl FromStr for SpeedUnit {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kmh" | "km/h" | "kph" | "metric" => Ok(Self::Kmh),
            "mph" | "imperial" => Ok(Self::Mph),
            _ => Err(SettingsError::UnknownVariant {
                key: "UseMph",
                value: s.to_string(),
            }),
        }
    }
}

/// Formats an odometer reading truncated (not rounded) to one decimal.
pub fn format_odometer(distance_km: f64, unit: SpeedUnit) -> String {
    let value = (unit.distance_from_km(distance_km).max(0.0) * 10.0).floor() / 10.0;
    format!("{value:.1} {}", unit.distance_label())
}

//! Text codec for the value types the settings file can hold.
//!
//! Every value is stored as text.  The formats are locale-independent:
//!
//! | Type                 | Written as                    | Read                          |
//! |----------------------|-------------------------------|-------------------------------|
//! | `bool`               | `True` / `False`              | any case of `true` / `false`  |
//! | integers             | decimal, `-` when negative    | decimal, optional `+`/`-`     |
//! | `f32` / `f64`        | shortest round-trip decimal   | decimal or exponent, `.` only |
//! | `String`             | as-is                         | as-is                         |
//! | `Vec<u8>`            | lowercase hex pairs           | hex pairs, even length        |
//! | `DateTime<Utc>`      | RFC 3339, `Z` suffix          | RFC 3339, any offset          |
//!
//! Parsing returns `None` rather than an error: the typed accessor turns that
//! into the caller's default.

use chrono::{DateTime, SecondsFormat, Utc};

/// A type that can be stored as a settings value.
pub trait ConfigValue: Sized {
    /// Human-readable type name used in log messages.
    const TYPE_NAME: &'static str;

    /// Canonical text form written to the file.
    fn to_config_string(&self) -> String;

    /// Parses stored text, or `None` if it is not a valid value of this type.
    fn from_config_str(raw: &str) -> Option<Self>;
}

impl ConfigValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn to_config_string(&self) -> String {
        let text = if *self { "True" } else { "False" };
        text.to_string()
    }

    fn from_config_str(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("true") {
            Some(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}

macro_rules! impl_config_value_via_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ConfigValue for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn to_config_string(&self) -> String {
                    self.to_string()
                }

                fn from_config_str(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }
            }
        )*
    };
}

// `Display` for floats never uses an exponent or a thousands separator and
// always round-trips through `FromStr`.
impl_config_value_via_str!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl ConfigValue for String {
    const TYPE_NAME: &'static str = "string";

    fn to_config_string(&self) -> String {
        self.clone()
    }

    fn from_config_str(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl ConfigValue for Vec<u8> {
    const TYPE_NAME: &'static str = "bytes";

    fn to_config_string(&self) -> String {
        hex::encode(self)
    }

    fn from_config_str(raw: &str) -> Option<Self> {
        hex::decode(raw.trim()).ok()
    }
}

impl ConfigValue for DateTime<Utc> {
    const TYPE_NAME: &'static str = "timestamp";

    fn to_config_string(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    fn from_config_str(raw: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

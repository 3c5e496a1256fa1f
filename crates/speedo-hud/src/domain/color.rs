//! ARGB colours for the HUD panel and text.

use serde::Serialize;

/// An 8-bit-per-channel colour with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Builds a colour from wide channel values, clamping each to 0–255.
    ///
    /// Used when loading, where a hand-edited file may hold `300` or `-1`.
    pub fn from_clamped(a: i32, r: i32, g: i32, b: i32) -> Self {
        Self::new(clamp_channel(a), clamp_channel(r), clamp_channel(g), clamp_channel(b))
    }

    /// Returns this colour with each channel moved by the given delta,
    /// saturating at 0 and 255.
    ///
    /// # Example
    ///
    /// ```
    /// use speedo_hud::domain::Argb;
    ///
    /// let c = Argb::new(250, 3, 100, 0).offset(10, -5, 5, 0);
    /// assert_eq!(c, Argb::new(255, 0, 105, 0));
    /// ```
    pub fn offset(self, da: i32, dr: i32, dg: i32, db: i32) -> Self {
        Self::from_clamped(
            i32::from(self.a) + da,
            i32::from(self.r) + dr,
            i32::from(self.g) + dg,
            i32::from(self.b) + db,
        )
    }
}

fn clamp_channel(value: i32) -> u8 {
    // Lossless after the clamp.
    value.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_moves_each_channel_independently() {
        let c = Argb::new(100, 100, 100, 100).offset(5, -5, 0, 20);

        assert_eq!(c, Argb::new(105, 95, 100, 120));
    }

    #[test]
    fn test_offset_saturates_at_both_ends() {
        let c = Argb::new(253, 2, 0, 255).offset(5, -5, -1, 1);

        assert_eq!(c, Argb::new(255, 0, 0, 255));
    }

    #[test]
    fn test_from_clamped_limits_out_of_range_channels() {
        assert_eq!(Argb::from_clamped(300, -1, 128, 255), Argb::new(255, 0, 128, 255));
    }

    #[test]
    fn test_offset_survives_extreme_deltas() {
        let c = Argb::new(0, 0, 0, 0).offset(i32::MAX - 10, i32::MIN + 10, 0, 0);

        assert_eq!(c, Argb::new(255, 0, 0, 0));
    }
}

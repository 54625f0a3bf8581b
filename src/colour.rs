//! Colour intensity for per-interval readings.

use std::fmt;

use serde::{Serialize, Serializer};

/// Reading (kWh per interval) at which a cell is drawn fully saturated.
pub const DEFAULT_SATURATION_CAP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Linear blend from `self` (t = 0) to `other` (t = 1).
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let v = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Maps readings onto a neutral-to-saturated colour ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColourScale {
    pub neutral: Rgb,
    pub used: Rgb,
    pub generated: Rgb,
    pub cap: f64,
}

impl Default for ColourScale {
    fn default() -> Self {
        ColourScale {
            neutral: Rgb::new(0xff, 0xff, 0xff),
            used: Rgb::new(0x95, 0x75, 0xcd),
            generated: Rgb::new(0x33, 0xac, 0x71),
            cap: DEFAULT_SATURATION_CAP,
        }
    }
}

impl ColourScale {
    pub fn with_cap(cap: f64) -> Self {
        ColourScale {
            cap,
            ..Default::default()
        }
    }

    /// `min(value / cap, 1)`, never below zero.
    pub fn intensity(&self, value: f64) -> f64 {
        if self.cap <= 0.0 || !self.cap.is_finite() {
            return if value > 0.0 { 1.0 } else { 0.0 };
        }
        (value / self.cap).clamp(0.0, 1.0)
    }

    pub fn used_colour(&self, value: f64) -> Rgb {
        self.neutral.lerp(self.used, self.intensity(value))
    }

    pub fn generated_colour(&self, value: f64) -> Rgb {
        self.neutral.lerp(self.generated, self.intensity(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_display() {
        assert_eq!(Rgb::new(0x95, 0x75, 0xcd).to_string(), "#9575cd");
        assert_eq!(Rgb::new(0, 10, 255).to_string(), "#000aff");
    }

    #[test]
    fn test_serializes_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(0x33, 0xac, 0x71)).unwrap();
        assert_eq!(json, "\"#33ac71\"");
    }

    #[test]
    fn test_zero_is_neutral() {
        let scale = ColourScale::default();
        assert_eq!(scale.used_colour(0.0), scale.neutral);
        assert_eq!(scale.generated_colour(0.0), scale.neutral);
    }

    #[test]
    fn test_cap_is_saturated() {
        let scale = ColourScale::default();
        assert_eq!(scale.used_colour(scale.cap), scale.used);
        assert_eq!(scale.generated_colour(scale.cap), scale.generated);
    }

    #[test]
    fn test_beyond_cap_does_not_overshoot() {
        let scale = ColourScale::default();
        assert_eq!(scale.used_colour(2.0 * scale.cap), scale.used_colour(scale.cap));
        assert_eq!(scale.intensity(100.0), 1.0);
    }

    #[test]
    fn test_midpoint_interpolates() {
        let scale = ColourScale::default();
        // halfway between ff and 95/75/cd, rounded
        assert_eq!(scale.used_colour(2.5), Rgb::new(0xca, 0xba, 0xe6));
    }

    #[test]
    fn test_intensity_is_monotonic() {
        let scale = ColourScale::with_cap(5.0);
        let mut last = scale.intensity(0.0);
        for i in 1..=60 {
            let next = scale.intensity(f64::from(i) * 0.1);
            assert!(next >= last);
            last = next;
        }
    }

    #[test]
    fn test_non_positive_cap_saturates_any_reading() {
        let scale = ColourScale::with_cap(0.0);
        assert_eq!(scale.intensity(0.0), 0.0);
        assert_eq!(scale.intensity(0.01), 1.0);
    }
}

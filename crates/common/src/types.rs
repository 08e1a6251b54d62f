use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Display-referred RGB color, each channel in `[0, 1]`.
///
/// Serialized as a `#RRGGBB` string so config files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Build a color from a packed `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Pack back into `0xRRGGBB`, rounding each channel.
    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// RGBA array with the given alpha, as uploaded to the GPU.
    pub fn with_alpha(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidColor(text.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|_| ConfigError::InvalidColor(text.to_string()))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.to_hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Exponential smoothing coefficient, strictly inside `(0, 1)`.
///
/// Each application moves a value the fraction `k` of the remaining distance
/// toward its target, so it converges without ever overshooting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothing(f32);

impl Smoothing {
    pub fn new(k: f32) -> Result<Self, ConfigError> {
        if k.is_finite() && k > 0.0 && k < 1.0 {
            Ok(Self(k))
        } else {
            Err(ConfigError::OutOfRange {
                field: "smoothing",
                value: k as f64,
                expected: "strictly between 0 and 1",
            })
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }

    /// One smoothing step: `current + (target - current) * k`.
    pub fn approach<T>(self, current: T, target: T) -> T
    where
        T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
    {
        current + (target - current) * self.0
    }
}

/// Host viewport in logical pixels plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    /// False for zero, negative or non-finite dimensions.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Pixel ratio limited to `cap`. A missing or bogus ratio reads as 1.
    pub fn capped_pixel_ratio(&self, cap: f32) -> f32 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio.min(cap)
        } else {
            1.0
        }
    }

    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    #[test]
    fn hex_color_roundtrips_through_string() {
        let gold = Rgb::from_hex(0xC4A968);
        assert_eq!(gold.to_string(), "#C4A968");
        assert_eq!(Rgb::parse("#c4a968").unwrap(), gold);
        assert_eq!(Rgb::parse("C4A968").unwrap(), gold);
    }

    #[test]
    fn malformed_colors_are_rejected() {
        assert!(matches!(Rgb::parse("#FFF"), Err(ConfigError::InvalidColor(_))));
        assert!(matches!(Rgb::parse("#GGGGGG"), Err(ConfigError::InvalidColor(_))));
    }

    #[test]
    fn smoothing_bounds_are_exclusive() {
        assert!(Smoothing::new(0.0).is_err());
        assert!(Smoothing::new(1.0).is_err());
        assert!(Smoothing::new(f32::NAN).is_err());
        assert_eq!(Smoothing::new(0.05).unwrap().get(), 0.05);
    }

    #[test]
    fn approach_moves_fraction_of_distance() {
        let k = Smoothing::new(0.25).unwrap();
        assert_eq!(k.approach(0.0_f32, 4.0), 1.0);
        assert_eq!(k.approach(Vec2::ZERO, Vec2::new(4.0, -8.0)), Vec2::new(1.0, -2.0));
        assert_eq!(k.approach(Vec3::ONE, Vec3::ONE), Vec3::ONE);
    }

    #[test]
    fn viewport_validity() {
        assert!(Viewport::new(800.0, 600.0, 1.0).is_valid());
        assert!(!Viewport::new(0.0, 600.0, 1.0).is_valid());
        assert!(!Viewport::new(800.0, -1.0, 1.0).is_valid());
        assert!(!Viewport::new(f32::INFINITY, 600.0, 1.0).is_valid());
    }

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(Viewport::new(1.0, 1.0, 3.0).capped_pixel_ratio(2.0), 2.0);
        assert_eq!(Viewport::new(1.0, 1.0, 1.5).capped_pixel_ratio(2.0), 1.5);
        assert_eq!(Viewport::new(1.0, 1.0, 0.0).capped_pixel_ratio(2.0), 1.0);
    }
}

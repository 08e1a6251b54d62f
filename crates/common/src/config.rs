use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{Rgb, Smoothing};

/// Errors from building or validating a [`FieldConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} = {value} is out of range: expected {expected}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("invalid color {0:?}: expected #RRGGBB")]
    InvalidColor(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// How overlapping particles combine with what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Colors sum, so dense regions glow.
    #[default]
    Additive,
    /// Ordinary alpha compositing.
    Alpha,
}

/// Every tunable of the particle field. All fields have defaults; a config
/// file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldConfig {
    /// Number of particles sampled on the sphere.
    pub particle_count: usize,
    /// Sphere radius in world units.
    pub radius: f32,
    /// Particle diameter in world units at unit depth.
    pub point_size: f32,
    pub color: Rgb,
    pub opacity: f32,
    pub blend: BlendMode,
    /// Peak fractional change of a particle's distance from the center.
    pub distortion_amplitude: f32,
    /// Angular rate of the distortion wave in radians per second.
    pub distortion_rate: f32,
    pub pointer_smoothing: f32,
    pub camera_smoothing: f32,
    /// Raw pointer offset per logical pixel away from the viewport center.
    pub pointer_scale: f32,
    /// Idle spin around the vertical axis in radians per second.
    pub base_spin: f32,
    /// Camera sway distance per unit of smoothed pointer offset.
    pub camera_sway: f32,
    /// Camera distance from the field center along +Z.
    pub camera_depth: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub max_pixel_ratio: f32,
    pub clear_color: Rgb,
    /// Multisample the surface (4x) when true.
    pub antialias: bool,
    /// Clear to fully transparent and let the host composite the field over
    /// whatever is behind the surface. `clear_color` is ignored when set.
    pub transparent: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 3000,
            radius: 1.6,
            point_size: 0.012,
            color: Rgb::from_hex(0xC4A968),
            opacity: 0.6,
            blend: BlendMode::Additive,
            distortion_amplitude: 0.15,
            distortion_rate: 1.5,
            pointer_smoothing: 0.05,
            camera_smoothing: 0.02,
            pointer_scale: 0.001,
            base_spin: 0.1,
            camera_sway: 2.0,
            camera_depth: 3.5,
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            max_pixel_ratio: 2.0,
            clear_color: Rgb::from_hex(0x0B0B0C),
            antialias: true,
            transparent: false,
        }
    }
}

impl FieldConfig {
    /// Parse a YAML document and validate it.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values that would make the per-tick math meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("radius", self.radius)?;
        positive("point_size", self.point_size)?;
        within("opacity", self.opacity, 0.0, 1.0, "between 0 and 1")?;
        finite("distortion_amplitude", self.distortion_amplitude)?;
        finite("distortion_rate", self.distortion_rate)?;
        finite("pointer_scale", self.pointer_scale)?;
        finite("base_spin", self.base_spin)?;
        finite("camera_sway", self.camera_sway)?;
        positive("camera_depth", self.camera_depth)?;
        self.pointer_smoothing()?;
        self.camera_smoothing()?;
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::OutOfRange {
                field: "fov_degrees",
                value: self.fov_degrees as f64,
                expected: "strictly between 0 and 180",
            });
        }
        positive("near", self.near)?;
        if !(self.far.is_finite() && self.far > self.near) {
            return Err(ConfigError::OutOfRange {
                field: "far",
                value: self.far as f64,
                expected: "finite and greater than near",
            });
        }
        within(
            "max_pixel_ratio",
            self.max_pixel_ratio,
            1.0,
            f32::MAX,
            "at least 1",
        )?;
        Ok(())
    }

    pub fn pointer_smoothing(&self) -> Result<Smoothing, ConfigError> {
        Smoothing::new(self.pointer_smoothing).map_err(|_| ConfigError::OutOfRange {
            field: "pointer_smoothing",
            value: self.pointer_smoothing as f64,
            expected: "strictly between 0 and 1",
        })
    }

    pub fn camera_smoothing(&self) -> Result<Smoothing, ConfigError> {
        Smoothing::new(self.camera_smoothing).map_err(|_| ConfigError::OutOfRange {
            field: "camera_smoothing",
            value: self.camera_smoothing as f64,
            expected: "strictly between 0 and 1",
        })
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value as f64,
            expected: "a finite number",
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value as f64,
            expected: "a positive finite number",
        })
    }
}

fn within(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
    expected: &'static str,
) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value as f64,
            expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = FieldConfig::default();
        config.validate().unwrap();
        assert_eq!(config.particle_count, 3000);
        assert_eq!(config.color.to_string(), "#C4A968");
        assert_eq!(config.blend, BlendMode::Additive);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = FieldConfig::from_yaml_str(
            "particle_count: 500\ncolor: \"#FFFFFF\"\nblend: alpha\n",
        )
        .unwrap();
        assert_eq!(config.particle_count, 500);
        assert_eq!(config.color, Rgb::from_hex(0xFFFFFF));
        assert_eq!(config.blend, BlendMode::Alpha);
        assert_eq!(config.radius, 1.6);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FieldConfig::from_yaml_str("particle_cnt: 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn smoothing_outside_unit_interval_is_rejected() {
        let config = FieldConfig {
            pointer_smoothing: 1.0,
            ..FieldConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "pointer_smoothing",
                ..
            }
        ));
    }

    #[test]
    fn negative_radius_is_rejected() {
        let config = FieldConfig {
            radius: -1.0,
            ..FieldConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn camera_must_sit_off_center() {
        let config = FieldConfig {
            camera_depth: 0.0,
            ..FieldConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn far_must_exceed_near() {
        let config = FieldConfig {
            near: 5.0,
            far: 5.0,
            ..FieldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "far", .. })
        ));
    }

    #[test]
    fn yaml_roundtrip_preserves_config() {
        let config = FieldConfig {
            particle_count: 42,
            antialias: false,
            ..FieldConfig::default()
        };
        let text = config.to_yaml_string().unwrap();
        assert_eq!(FieldConfig::from_yaml_str(&text).unwrap(), config);
    }

    #[test]
    fn transparency_is_opt_in() {
        assert!(!FieldConfig::default().transparent);
        let config = FieldConfig::from_yaml_str("transparent: true\n").unwrap();
        assert!(config.transparent);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "radius: 2.5\nopacity: 0.3").unwrap();
        let config = FieldConfig::load(file.path()).unwrap();
        assert_eq!(config.radius, 2.5);
        assert_eq!(config.opacity, 0.3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = FieldConfig::load("/nonexistent/aurum.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

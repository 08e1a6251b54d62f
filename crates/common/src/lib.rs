//! Shared types for the aurum particle field.
//!
//! # Invariants
//! - A [`Smoothing`] coefficient is always strictly inside `(0, 1)`.
//! - A [`FieldConfig`] that passed [`FieldConfig::validate`] never produces
//!   a non-finite value in the per-tick math.

pub mod config;
pub mod types;

pub use config::{BlendMode, ConfigError, FieldConfig};
pub use types::{Rgb, Smoothing, Viewport};

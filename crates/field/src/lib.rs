//! Particle field: base positions sampled once on a sphere, then displaced
//! every frame by a time-parameterized wave.
//!
//! # Invariants
//! - Base positions never change after a [`ParticleSet`] is built.
//! - The current position buffer always has exactly `count` points.
//! - Per-frame distortion never allocates.

pub mod clock;
pub mod particles;
pub mod sphere;
pub mod wave;

pub use clock::{Clock, SteppedClock, SystemClock};
pub use particles::ParticleSet;
pub use sphere::fibonacci_sphere;
pub use wave::WaveDistortion;

/// A point in field space, laid out the way the GPU vertex buffer expects.
pub type Point = [f32; 3];

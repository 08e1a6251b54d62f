use aurum_common::FieldConfig;

use crate::{Point, WaveDistortion, fibonacci_sphere};

/// Immutable base positions plus the per-frame position buffer derived from them.
///
/// Both buffers are allocated once at construction and have the same length
/// for the lifetime of the set.
#[derive(Debug, Clone)]
pub struct ParticleSet {
    base: Box<[Point]>,
    current: Box<[Point]>,
}

impl ParticleSet {
    /// Sample `count` particles on a sphere of `radius`.
    pub fn sphere(count: usize, radius: f32) -> Self {
        Self::from_base(fibonacci_sphere(count, radius))
    }

    pub fn from_config(config: &FieldConfig) -> Self {
        let set = Self::sphere(config.particle_count, config.radius);
        tracing::debug!(
            count = set.count(),
            radius = config.radius,
            "sampled particle sphere"
        );
        set
    }

    /// Take ownership of precomputed base positions. The current buffer starts
    /// as a copy of them.
    pub fn from_base(base: Vec<Point>) -> Self {
        let base = base.into_boxed_slice();
        let current = base.clone();
        Self { base, current }
    }

    pub fn count(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    pub fn base(&self) -> &[Point] {
        &self.base
    }

    pub fn current(&self) -> &[Point] {
        &self.current
    }

    /// The current buffer as `count * 3` packed floats.
    pub fn current_flat(&self) -> &[f32] {
        self.current.as_flattened()
    }

    /// Recompute every current position from its base position at time `t`.
    pub fn distort(&mut self, wave: &WaveDistortion, t: f64) {
        wave.apply(&self.base, &mut self.current, t);
    }
}

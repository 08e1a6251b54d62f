use std::f64::consts::TAU;

use aurum_common::FieldConfig;

use crate::Point;

/// Radial "breathing" displacement driven by time.
///
/// Each point is scaled by `1 + sin(2x + t*rate) * cos(2y + t*rate) * amplitude`,
/// using its own base coordinates. Scaling the position vector stands in for
/// moving along the outward normal, which only holds while the base set is a
/// sphere centered at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveDistortion {
    pub amplitude: f32,
    /// Radians per second.
    pub angular_rate: f32,
}

impl Default for WaveDistortion {
    fn default() -> Self {
        Self {
            amplitude: 0.15,
            angular_rate: 1.5,
        }
    }
}

impl From<&FieldConfig> for WaveDistortion {
    fn from(config: &FieldConfig) -> Self {
        Self::new(config.distortion_amplitude, config.distortion_rate)
    }
}

impl WaveDistortion {
    pub fn new(amplitude: f32, angular_rate: f32) -> Self {
        Self {
            amplitude,
            angular_rate,
        }
    }

    /// Wave phase at time `t`, reduced to one turn before narrowing to `f32`.
    ///
    /// Positions depend on time only through this value.
    pub fn phase(&self, t: f64) -> f32 {
        ((t * self.angular_rate as f64) % TAU) as f32
    }

    /// Scale factor applied to `base` at time `t`.
    pub fn scale_at(&self, base: Point, t: f64) -> f32 {
        self.scale_with_phase(base, self.phase(t))
    }

    /// Displace one point.
    pub fn displace(&self, base: Point, t: f64) -> Point {
        self.displace_with_phase(base, self.phase(t))
    }

    /// Rewrite `out` from `base` at time `t`. Both slices must be the same
    /// length; nothing is allocated.
    pub fn apply(&self, base: &[Point], out: &mut [Point], t: f64) {
        debug_assert_eq!(base.len(), out.len());
        let phase = self.phase(t);
        for (dst, src) in out.iter_mut().zip(base) {
            *dst = self.displace_with_phase(*src, phase);
        }
    }

    #[inline]
    fn scale_with_phase(&self, base: Point, phase: f32) -> f32 {
        let distortion = (base[0] * 2.0 + phase).sin() * (base[1] * 2.0 + phase).cos();
        1.0 + distortion * self.amplitude
    }

    #[inline]
    fn displace_with_phase(&self, base: Point, phase: f32) -> Point {
        let scale = self.scale_with_phase(base, phase);
        base.map(|c| c * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fibonacci_sphere;

    #[test]
    fn dividing_by_scale_recovers_base() {
        let wave = WaveDistortion::default();
        let base = fibonacci_sphere(200, 1.6);
        for &t in &[0.0f64, 0.37, 5.0, 123.4] {
            for p in &base {
                let out = wave.displace(*p, t);
                let scale = wave.scale_at(*p, t);
                for axis in 0..3 {
                    assert!((out[axis] / scale - p[axis]).abs() < 1e-5);
                }
            }
        }
    }

    #[test]
    fn scale_stays_within_amplitude() {
        let wave = WaveDistortion::new(0.15, 1.5);
        for p in fibonacci_sphere(500, 1.6) {
            let s = wave.scale_at(p, 2.0);
            assert!((0.85 - 1e-6..=1.15 + 1e-6).contains(&s));
        }
    }

    #[test]
    fn zero_amplitude_is_identity() {
        let wave = WaveDistortion::new(0.0, 1.5);
        let base = fibonacci_sphere(50, 1.0);
        let mut out = vec![[0.0; 3]; base.len()];
        wave.apply(&base, &mut out, 9.0);
        assert_eq!(out, base);
    }

    #[test]
    fn displacement_is_radial() {
        let wave = WaveDistortion::default();
        let p = [1.0, 0.5, -0.25];
        let out = wave.displace(p, 0.8);
        // Parallel vectors have a zero cross product.
        let cross = [
            p[1] * out[2] - p[2] * out[1],
            p[2] * out[0] - p[0] * out[2],
            p[0] * out[1] - p[1] * out[0],
        ];
        assert!(cross.iter().all(|c| c.abs() < 1e-6));
    }

    #[test]
    fn phase_stays_smooth_on_long_runs() {
        let wave = WaveDistortion::default();
        let dt = 1.0 / 60.0;
        let five_days = 5.0 * 24.0 * 3600.0;
        let p = [0.3, -0.7, 1.4];
        let mut previous = wave.scale_at(p, five_days);
        for frame in 1..6 {
            let t = five_days + frame as f64 * dt;
            let step = wave.phase(t) - wave.phase(t - dt);
            assert!((step - 1.5 * dt as f32).abs() < 1e-4, "phase step {step}");
            let scale = wave.scale_at(p, t);
            assert_ne!(scale, previous, "frame {frame} repeated");
            previous = scale;
        }
    }

    #[test]
    fn phase_is_reduced_to_one_turn() {
        let wave = WaveDistortion::default();
        for &t in &[0.0, 10.0, 1.0e6, 4.32e5] {
            let phase = wave.phase(t);
            assert!((0.0..std::f32::consts::TAU).contains(&phase));
        }
    }

    #[test]
    fn empty_input_is_a_noop() {
        let mut out: Vec<Point> = Vec::new();
        WaveDistortion::default().apply(&[], &mut out, 1.0);
        assert!(out.is_empty());
    }
}

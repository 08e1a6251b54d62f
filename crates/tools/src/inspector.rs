use aurum_field::{ParticleSet, Point};
use glam::{DVec3, Vec3};
use serde::Serialize;

/// Particle field inspector for developer tooling.
///
/// Provides read-only queries against a particle set for debugging and the
/// command-line tools.
pub struct ParticleInspector;

impl ParticleInspector {
    /// Summarize the current (displaced) position buffer.
    pub fn summary(set: &ParticleSet) -> FieldSummary {
        let summary = Self::summarize(set.current(), set.current_flat().len());
        tracing::trace!(count = summary.count, "summarized particle field");
        summary
    }

    /// Summarize the base positions the set was sampled with.
    pub fn base_summary(set: &ParticleSet) -> FieldSummary {
        Self::summarize(set.base(), set.base().len() * 3)
    }

    /// Base and current position of one particle.
    pub fn inspect_particle(set: &ParticleSet, index: usize) -> Option<ParticleInfo> {
        let base = *set.base().get(index)?;
        let current = *set.current().get(index)?;
        Some(ParticleInfo {
            index,
            base,
            current,
            displacement: Vec3::from(current).length() - Vec3::from(base).length(),
        })
    }

    fn summarize(points: &[Point], buffer_len: usize) -> FieldSummary {
        let mut min_radius = f32::INFINITY;
        let mut max_radius = 0.0_f32;
        let mut radius_sum = 0.0_f64;
        let mut centroid = DVec3::ZERO;
        let mut all_finite = true;

        for p in points {
            all_finite &= p.iter().all(|c| c.is_finite());
            let v = Vec3::from(*p);
            let r = v.length();
            min_radius = min_radius.min(r);
            max_radius = max_radius.max(r);
            radius_sum += r as f64;
            centroid += v.as_dvec3();
        }

        let count = points.len();
        if count == 0 {
            return FieldSummary {
                count,
                buffer_len,
                min_radius: 0.0,
                max_radius: 0.0,
                mean_radius: 0.0,
                centroid: [0.0; 3],
                all_finite,
            };
        }

        let n = count as f64;
        FieldSummary {
            count,
            buffer_len,
            min_radius,
            max_radius,
            mean_radius: (radius_sum / n) as f32,
            centroid: (centroid / n).as_vec3().to_array(),
            all_finite,
        }
    }
}

/// Aggregate shape of a position buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub count: usize,
    /// Length of the flat `x, y, z` buffer handed to the GPU.
    pub buffer_len: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    pub mean_radius: f32,
    pub centroid: [f32; 3],
    pub all_finite: bool,
}

impl std::fmt::Display for FieldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Field: particles={} buffer={} radius=[{:.4}, {:.4}] mean={:.4} centroid=({:.4}, {:.4}, {:.4}) finite={}",
            self.count,
            self.buffer_len,
            self.min_radius,
            self.max_radius,
            self.mean_radius,
            self.centroid[0],
            self.centroid[1],
            self.centroid[2],
            self.all_finite,
        )
    }
}

/// Detailed info about a single particle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleInfo {
    pub index: usize,
    pub base: Point,
    pub current: Point,
    /// Signed change in distance from the origin.
    pub displacement: f32,
}

impl std::fmt::Display for ParticleInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Particle [{}] base=({:.3}, {:.3}, {:.3}) now=({:.3}, {:.3}, {:.3}) dr={:+.4}",
            self.index,
            self.base[0],
            self.base[1],
            self.base[2],
            self.current[0],
            self.current[1],
            self.current[2],
            self.displacement,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurum_field::WaveDistortion;

    #[test]
    fn summary_empty_field() {
        let set = ParticleSet::sphere(0, 1.6);
        let summary = ParticleInspector::summary(&set);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.buffer_len, 0);
        assert_eq!(summary.mean_radius, 0.0);
        assert!(summary.all_finite);
    }

    #[test]
    fn summary_of_undistorted_sphere() {
        let set = ParticleSet::sphere(3000, 1.6);
        let summary = ParticleInspector::summary(&set);
        assert_eq!(summary.count, 3000);
        assert_eq!(summary.buffer_len, 9000);
        assert!((summary.min_radius - 1.6).abs() < 1e-5);
        assert!((summary.max_radius - 1.6).abs() < 1e-5);
        assert!(summary.centroid.iter().all(|c| c.abs() < 1e-2));
        assert!(summary.all_finite);
    }

    #[test]
    fn distortion_widens_radius_band() {
        let mut set = ParticleSet::sphere(500, 1.0);
        set.distort(&WaveDistortion::default(), 0.7);

        let base = ParticleInspector::base_summary(&set);
        let current = ParticleInspector::summary(&set);
        assert!((base.max_radius - base.min_radius).abs() < 1e-5);
        assert!(current.max_radius > base.max_radius);
        assert!(current.min_radius < base.min_radius);
        assert!(current.max_radius <= 1.15 + 1e-5);
        assert!(current.min_radius >= 0.85 - 1e-5);
    }

    #[test]
    fn inspect_particle_found() {
        let set = ParticleSet::sphere(10, 2.0);
        let info = ParticleInspector::inspect_particle(&set, 0).unwrap();
        assert_eq!(info.index, 0);
        assert_eq!(info.base, info.current);
        assert_eq!(info.displacement, 0.0);
    }

    #[test]
    fn inspect_particle_not_found() {
        let set = ParticleSet::sphere(10, 2.0);
        assert!(ParticleInspector::inspect_particle(&set, 10).is_none());
    }

    #[test]
    fn summary_display() {
        let set = ParticleSet::sphere(8, 1.0);
        let s = format!("{}", ParticleInspector::summary(&set));
        assert!(s.contains("particles=8"));
        assert!(s.contains("buffer=24"));
    }
}

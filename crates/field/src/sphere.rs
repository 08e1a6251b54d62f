use glam::DVec3;

use crate::Point;

/// Sample `count` points on a sphere of `radius` centered at the origin using
/// golden-angle (Fibonacci) spacing.
///
/// For index `i`: `phi = acos(-1 + 2i/count)`, `theta = sqrt(count * PI) * phi`,
/// and the point is `radius * (cos(theta) sin(phi), sin(theta) sin(phi), cos(phi))`.
/// The latitude parameter walks from the south pole upward, so consecutive
/// points spiral around the sphere with near-uniform spacing.
///
/// Computed in `f64` and narrowed once so every point keeps its norm to within
/// `f32` rounding of `radius`.
pub fn fibonacci_sphere(count: usize, radius: f32) -> Vec<Point> {
    let n = count as f64;
    let r = radius as f64;
    let spiral = (n * std::f64::consts::PI).sqrt();

    (0..count)
        .map(|i| {
            let phi = (-1.0 + 2.0 * i as f64 / n).acos();
            let theta = spiral * phi;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let p = DVec3::new(theta.cos() * sin_phi, theta.sin() * sin_phi, cos_phi) * r;
            p.as_vec3().to_array()
        })
        .collect()
}

use aurum_common::{BlendMode, FieldConfig, Rgb, Viewport};
use aurum_field::Point;
use glam::Mat4;

use crate::RenderError;

/// Drawable size in physical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Physical size of a valid viewport at the given pixel ratio. Never zero.
    pub fn from_viewport(viewport: &Viewport, pixel_ratio: f32) -> Self {
        let scale = |logical: f32| ((logical * pixel_ratio).round() as u32).max(1);
        Self {
            width: scale(viewport.width),
            height: scale(viewport.height),
        }
    }
}

/// How particles are drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    pub color: Rgb,
    /// World-space diameter at unit depth.
    pub size: f32,
    pub opacity: f32,
    pub blend: BlendMode,
}

impl From<&FieldConfig> for PointMaterial {
    fn from(config: &FieldConfig) -> Self {
        Self {
            color: config.color,
            size: config.point_size,
            opacity: config.opacity,
            blend: config.blend,
        }
    }
}

/// Everything a backend needs to build its resources.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSpec {
    pub size: SurfaceSize,
    pub material: PointMaterial,
    pub particle_count: usize,
    pub clear_color: Rgb,
    pub antialias: bool,
    /// Clear to alpha 0 and composite over the host's content.
    pub transparent: bool,
}

/// One frame's worth of draw input.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Present when the position buffer changed since the last successful frame.
    pub positions: Option<&'a [Point]>,
    pub model: Mat4,
    pub view_proj: Mat4,
    pub aspect: f32,
}

/// A render-capable surface bound to the host's container.
pub trait FrameSurface {
    /// Match the drawable to a new physical size.
    fn resize(&mut self, size: SurfaceSize);

    /// Upload changed positions if any and submit the frame.
    fn present(&mut self, frame: &Frame<'_>) -> Result<(), RenderError>;

    /// Free GPU-side resources. Called exactly once by the owning context.
    fn release(&mut self);
}

/// The host container a surface is mounted into.
pub trait SurfaceHost {
    type Surface: FrameSurface;

    /// Create the surface. Fails with [`RenderError::CapabilityMissing`] when the
    /// host cannot render.
    fn acquire(self, spec: &SurfaceSpec) -> Result<Self::Surface, RenderError>;
}

/// The host's per-display-refresh scheduling primitive.
pub trait FrameScheduler {
    /// Ask the host to run one more tick on its next refresh.
    fn request_frame(&mut self);
}

impl<F: FnMut()> FrameScheduler for F {
    fn request_frame(&mut self) {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_size_scales_by_pixel_ratio() {
        let size = SurfaceSize::from_viewport(&Viewport::new(800.0, 600.0, 3.0), 2.0);
        assert_eq!(size, SurfaceSize::new(1600, 1200));
    }

    #[test]
    fn surface_size_is_never_zero() {
        let size = SurfaceSize::from_viewport(&Viewport::new(0.2, 0.2, 1.0), 1.0);
        assert_eq!(size, SurfaceSize::new(1, 1));
    }

    #[test]
    fn material_follows_config() {
        let material = PointMaterial::from(&FieldConfig::default());
        assert_eq!(material.size, 0.012);
        assert_eq!(material.opacity, 0.6);
        assert_eq!(material.blend, BlendMode::Additive);
    }

    #[test]
    fn closures_schedule_frames() {
        let mut requested = 0;
        let mut scheduler = || requested += 1;
        scheduler.request_frame();
        scheduler.request_frame();
        assert_eq!(requested, 2);
    }
}

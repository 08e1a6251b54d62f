use aurum_field::{ParticleSet, WaveDistortion};
use glam::Vec2;

use crate::{CameraRig, FieldPose, Frame, FrameSurface, PointMaterial, RenderError, SurfaceSize};

/// Exclusively owned bundle of everything a running loop renders with.
///
/// Dropping the context releases the surface, so every path out of `Running`
/// frees GPU resources exactly once.
pub struct RenderContext<S: FrameSurface> {
    surface: S,
    particles: ParticleSet,
    camera: CameraRig,
    material: PointMaterial,
    pose: FieldPose,
    /// Wave phase of the positions the surface last accepted.
    uploaded_phase: Option<f32>,
    geometry_dirty: bool,
}

impl<S: FrameSurface> RenderContext<S> {
    pub fn new(
        surface: S,
        particles: ParticleSet,
        camera: CameraRig,
        material: PointMaterial,
    ) -> Self {
        Self {
            surface,
            particles,
            camera,
            material,
            pose: FieldPose::default(),
            uploaded_phase: None,
            geometry_dirty: true,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn material(&self) -> &PointMaterial {
        &self.material
    }

    pub fn pose(&self) -> FieldPose {
        self.pose
    }

    pub fn geometry_dirty(&self) -> bool {
        self.geometry_dirty
    }

    pub(crate) fn resize(&mut self, aspect: f32, size: SurfaceSize) {
        self.camera.set_aspect(aspect);
        self.surface.resize(size);
    }

    /// Advance the field to time `t` and submit one frame.
    ///
    /// Positions are recomputed and uploaded only when the wave phase moved
    /// since the last accepted upload. The geometry stays dirty when
    /// submission fails so the next frame re-uploads it.
    pub(crate) fn render_frame(
        &mut self,
        wave: &WaveDistortion,
        t: f64,
        smoothed: Vec2,
    ) -> Result<(), RenderError> {
        let phase = wave.phase(t);
        if self.uploaded_phase != Some(phase) {
            self.particles.distort(wave, t);
            self.geometry_dirty = true;
        }
        self.pose = self.camera.update(t, smoothed);

        let frame = Frame {
            positions: self.geometry_dirty.then(|| self.particles.current()),
            model: self.pose.model_matrix(),
            view_proj: self.camera.view_projection(),
            aspect: self.camera.aspect,
        };
        self.surface.present(&frame)?;
        if self.geometry_dirty {
            self.uploaded_phase = Some(phase);
            self.geometry_dirty = false;
        }
        Ok(())
    }
}

impl<S: FrameSurface> Drop for RenderContext<S> {
    fn drop(&mut self) {
        self.surface.release();
        tracing::debug!(particles = self.particles.count(), "render context released");
    }
}

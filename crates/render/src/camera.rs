use std::f64::consts::TAU;

use aurum_common::{ConfigError, FieldConfig, Smoothing};
use glam::{Mat4, Vec2, Vec3};

/// Orientation of the particle set for one frame.
///
/// Recomputed from time and pointer every tick, never accumulated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldPose {
    /// Rotation around the vertical axis, radians.
    pub yaw: f32,
    /// Rotation around the horizontal axis, radians.
    pub pitch: f32,
}

impl FieldPose {
    /// Model matrix: pitch applied after yaw (X then Y in intrinsic order).
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.pitch) * Mat4::from_rotation_y(self.yaw)
    }
}

/// Camera that sways with the pointer and always faces the field center.
///
/// The only state carried between frames is `position`.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub position: Vec3,
    pub look_at: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    smoothing: Smoothing,
    sway: f32,
    depth: f32,
    base_spin: f32,
}

impl CameraRig {
    pub fn new(smoothing: Smoothing, sway: f32, depth: f32, base_spin: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, depth),
            look_at: Vec3::ZERO,
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            smoothing,
            sway,
            depth,
            base_spin,
        }
    }

    pub fn from_config(config: &FieldConfig, aspect: f32) -> Result<Self, ConfigError> {
        let mut rig = Self::new(
            config.camera_smoothing()?,
            config.camera_sway,
            config.camera_depth,
            config.base_spin,
        );
        rig.fov = config.fov_degrees.to_radians();
        rig.near = config.near;
        rig.far = config.far;
        rig.aspect = aspect;
        Ok(rig)
    }

    /// Where the camera is heading for a given smoothed pointer offset.
    pub fn sway_target(&self, smoothed: Vec2) -> Vec3 {
        Vec3::new(smoothed.x * self.sway, -smoothed.y * self.sway, self.depth)
    }

    /// Field orientation at time `t`; has no side effects. The idle spin is
    /// reduced to one turn before narrowing.
    pub fn pose(&self, t: f64, smoothed: Vec2) -> FieldPose {
        let spin = ((t * self.base_spin as f64) % TAU) as f32;
        FieldPose {
            yaw: spin + smoothed.x,
            pitch: smoothed.y,
        }
    }

    /// Advance one frame: ease the camera toward its sway target and return
    /// the field orientation.
    pub fn update(&mut self, t: f64, smoothed: Vec2) -> FieldPose {
        let target = self.sway_target(smoothed);
        self.position = self.smoothing.approach(self.position, target);
        self.pose(t, smoothed)
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        CameraRig::new(Smoothing::new(0.02).unwrap(), 2.0, 3.5, 0.1)
    }

    #[test]
    fn starts_on_axis_at_depth() {
        let cam = rig();
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 3.5));
        let vp = cam.view_projection();
        assert!(vp.is_finite());
    }

    #[test]
    fn pose_is_recomputed_not_accumulated() {
        let mut cam = rig();
        let s = Vec2::new(0.2, -0.1);
        for _ in 0..100 {
            cam.update(4.0, s);
        }
        let pose = cam.update(4.0, s);
        assert!((pose.yaw - (4.0 * 0.1 + 0.2)).abs() < 1e-6);
        assert_eq!(pose.pitch, -0.1);
    }

    #[test]
    fn spin_advances_every_frame_on_long_runs() {
        let cam = rig();
        let dt = 1.0 / 60.0;
        let three_days = 3.0 * 24.0 * 3600.0;
        let mut previous = cam.pose(three_days, Vec2::ZERO).yaw;
        for frame in 1..6 {
            let yaw = cam.pose(three_days + frame as f64 * dt, Vec2::ZERO).yaw;
            assert!(yaw.abs() < std::f32::consts::TAU);
            assert!((yaw - previous - 0.1 * dt as f32).abs() < 1e-5);
            previous = yaw;
        }
    }

    #[test]
    fn sway_target_mirrors_vertical_offset() {
        let cam = rig();
        assert_eq!(cam.sway_target(Vec2::new(0.5, 0.25)), Vec3::new(1.0, -0.5, 3.5));
    }

    #[test]
    fn camera_eases_toward_target() {
        let mut cam = rig();
        let s = Vec2::new(0.5, 0.5);
        let target = cam.sway_target(s);
        cam.update(0.0, s);
        assert!((cam.position.x - 1.0 * 0.02).abs() < 1e-6);
        for _ in 0..1000 {
            cam.update(0.0, s);
        }
        assert!(cam.position.distance(target) < 1e-3);
        assert_eq!(cam.position.z, 3.5);
    }

    #[test]
    fn always_faces_the_center() {
        let mut cam = rig();
        for step in 0..50 {
            cam.update(step as f64 * 0.016, Vec2::new(0.8, -0.6));
            let center_in_view = cam.view_matrix().transform_point3(Vec3::ZERO);
            assert!(center_in_view.x.abs() < 1e-4);
            assert!(center_in_view.y.abs() < 1e-4);
            assert!(center_in_view.z < 0.0);
        }
    }

    #[test]
    fn model_matrix_applies_yaw_then_pitch() {
        let pose = FieldPose {
            yaw: std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
        };
        let p = pose.model_matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);

        let pose = FieldPose {
            yaw: 0.0,
            pitch: std::f32::consts::FRAC_PI_2,
        };
        let p = pose.model_matrix().transform_point3(Vec3::Y);
        assert!((p - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn config_sets_projection() {
        let config = FieldConfig::default();
        let cam = CameraRig::from_config(&config, 2.0).unwrap();
        assert_eq!(cam.aspect, 2.0);
        assert!((cam.fov - 75.0_f32.to_radians()).abs() < 1e-6);
        assert_eq!(cam.position.z, config.camera_depth);
    }
}

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Perspective camera looking from `position` at `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 5.0),
            target: Vec3::ZERO,
            fov_degrees: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
            ..Self::default()
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Unit vector the camera looks along. Zero if position and target coincide.
    pub fn world_direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Match the aspect ratio to a surface size. Zero-height surfaces are ignored.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

/// Orbit-style rig: a camera plus the point it orbits around.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraRig {
    pub camera: PerspectiveCamera,
    pub target: Vec3,
}

impl CameraRig {
    pub fn new(camera: PerspectiveCamera) -> Self {
        Self {
            target: camera.target,
            camera,
        }
    }

    /// Move the orbit centre; the camera keeps its position and looks at it.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.camera.target = target;
    }

    /// Translate the camera without changing the orbit centre.
    pub fn translate(&mut self, delta: Vec3) {
        self.camera.position += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_points_at_target() {
        let camera = PerspectiveCamera::default().at(Vec3::new(0.0, 0.0, 5.0));
        assert!((camera.world_direction() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn aspect_follows_surface_size() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(800, 400);
        assert_eq!(camera.aspect, 2.0);
        camera.set_aspect(800, 0);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn rig_target_drives_camera_target() {
        let mut rig = CameraRig::new(PerspectiveCamera::default());
        rig.set_target(Vec3::new(1.0, 0.0, 1.0));
        rig.translate(Vec3::X);
        assert_eq!(rig.camera.target, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(rig.camera.position, Vec3::new(1.0, 2.0, 5.0));
    }
}

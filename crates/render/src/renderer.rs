use std::fmt::Write;

use playground_scene::{PerspectiveCamera, Scene};

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer draws the attached nodes of a scene as seen from a camera. It
/// keeps its own frame state but never touches the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Resize the drawing surface.
    fn set_size(&mut self, width: u32, height: u32);

    /// Render one frame.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;
}

/// Resize the surface and keep every camera's aspect ratio in step with it.
pub fn resize_surface<R: Renderer>(
    renderer: &mut R,
    cameras: &mut [PerspectiveCamera],
    width: u32,
    height: u32,
) {
    renderer.set_size(width, height);
    for camera in cameras.iter_mut() {
        camera.set_aspect(width, height);
    }
    tracing::debug!(width, height, cameras = cameras.len(), "surface resized");
}

/// Text renderer for the headless CLI and tests.
///
/// Produces a human-readable listing of the camera and every attached node.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frame: u64,
    width: u32,
    height: u32,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        self.frame += 1;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({}x{}) ===",
            self.frame, self.width, self.height
        );
        let _ = writeln!(out, "Objects: {}", scene.len());
        let (p, t) = (camera.position, camera.target);
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            p.x, p.y, p.z, t.x, t.y, t.z, camera.fov_degrees
        );

        for (id, node) in scene.nodes() {
            let p = node.visual.transform.position;
            let (axis, angle) = node.visual.transform.rotation.to_axis_angle();
            let yaw = if axis.y < 0.0 { -angle } else { angle };
            let _ = writeln!(
                out,
                "  [{:>3}] {:<12} pos=({:.2}, {:.2}, {:.2}) yaw={:.2}",
                id.0, node.visual.label, p.x, p.y, p.z, yaw
            );
        }

        out
    }
}

//! Scene: the render-side half of every playground object.
//!
//! # Invariants
//! - A visual is attached to at most one scene node; the node owns it until detached.
//! - Every GPU-side resource registered on attach is released exactly once on detach.
//! - Node ids are never reused within a scene.

pub mod camera;
pub mod graph;
pub mod visual;

pub use camera::{CameraRig, PerspectiveCamera};
pub use graph::{
    GpuResource, NodeId, ResourceId, ResourceKind, ResourceState, ResourceTable, Scene, SceneNode,
};
pub use visual::{Geometry, Material, MeshPart, VisualObject};

pub fn crate_info() -> &'static str {
    "playground-scene"
}

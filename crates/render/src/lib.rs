//! Rendering adapter: renderer-agnostic interface over the scene.
//!
//! # Invariants
//! - Renderers read the scene and a camera; they never mutate either.
//! - Surface size changes reach the renderer and every camera's aspect together.

mod renderer;

pub use renderer::{DebugTextRenderer, Renderer, resize_surface};

pub fn crate_info() -> &'static str {
    "playground-render v0.1.0"
}

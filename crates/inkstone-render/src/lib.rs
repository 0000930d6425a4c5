//! Inkstone Render Library
//!
//! The renderer contract used by the editor, and `SceneRenderer`, which turns the scene
//! into styled `kurbo` paths ready for a rasterizer.

mod renderer;
mod scene;

pub use renderer::Renderer;
pub use scene::{DrawCommand, SceneRenderer};

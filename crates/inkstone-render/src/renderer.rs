//! Renderer trait abstraction.

use inkstone_core::{Model, Stroke};

/// Trait for rendering backends.
///
/// Calls are fire-and-forget: the editor never waits on or inspects a result.
pub trait Renderer: Send + Sync {
    /// Prepare the surface for a new session.
    fn init(&mut self, model: &Model) {
        self.resize(model);
    }

    /// Draw the stroke currently being captured, on top of the committed scene.
    fn draw_pending_stroke(&mut self, stroke: &Stroke);

    /// Redraw the whole scene after a committed change.
    fn draw_model(&mut self, model: &Model);

    /// React to a change of scene size.
    fn resize(&mut self, model: &Model);

    /// Release resources held for the session.
    fn destroy(&mut self) {}
}

//! Path-building renderer.

use crate::renderer::Renderer;
use inkstone_core::{Model, Stroke};
use kurbo::{BezPath, Cap, Join, Rect, Shape, Size};
use peniko::Color;

/// One stroked path ready for a rasterizer.
#[derive(Debug, Clone)]
pub struct DrawCommand {
    pub path: BezPath,
    pub stroke: kurbo::Stroke,
    pub color: Color,
}

impl DrawCommand {
    /// Build the draw command for an ink stroke.
    pub fn from_stroke(stroke: &Stroke) -> Self {
        let style = stroke.style();
        Self {
            path: stroke.to_path(),
            stroke: kurbo::Stroke::new(style.width)
                .with_caps(Cap::Round)
                .with_join(Join::Round),
            color: style.effective_color().into(),
        }
    }

    /// Area covered by the path including the pen width.
    pub fn bounds(&self) -> Rect {
        self.path.bounding_box().inflate(self.stroke.width / 2.0, self.stroke.width / 2.0)
    }
}

/// Keeps a display list of the committed scene plus the pending stroke.
#[derive(Debug, Default)]
pub struct SceneRenderer {
    size: Size,
    committed: Vec<DrawCommand>,
    pending: Option<DrawCommand>,
    frames: u64,
}

impl SceneRenderer {
    /// Create a new renderer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Draw commands for the committed scene, back to front.
    pub fn committed(&self) -> &[DrawCommand] {
        &self.committed
    }

    pub fn pending(&self) -> Option<&DrawCommand> {
        self.pending.as_ref()
    }

    /// Number of frames produced since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// All draw commands of the current frame, pending stroke last.
    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.committed.iter().chain(self.pending.iter())
    }

    /// Bounding box of everything drawn.
    pub fn bounds(&self) -> Option<Rect> {
        self.commands()
            .map(DrawCommand::bounds)
            .reduce(|acc, rect| acc.union(rect))
    }
}

impl Renderer for SceneRenderer {
    fn draw_pending_stroke(&mut self, stroke: &Stroke) {
        self.pending = Some(DrawCommand::from_stroke(stroke));
        self.frames += 1;
    }

    fn draw_model(&mut self, model: &Model) {
        self.committed = model.strokes().iter().map(DrawCommand::from_stroke).collect();
        self.pending = model.current_stroke().map(DrawCommand::from_stroke);
        self.frames += 1;
        log::debug!("scene rebuilt with {} strokes", self.committed.len());
    }

    fn resize(&mut self, model: &Model) {
        self.size = Size::new(model.width, model.height);
        self.draw_model(model);
    }

    fn destroy(&mut self) {
        self.committed.clear();
        self.pending = None;
    }
}

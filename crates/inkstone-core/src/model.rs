//! The ink scene: sealed strokes, the stroke being drawn, and recognition exports.

use crate::error::{InkResult, InvalidInputError, StateError};
use crate::stroke::{PointerSample, PointerType, Stroke};
use crate::style::PenStyle;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// JIIX export mime type.
pub const MIME_JIIX: &str = "application/vnd.myscript.jiix";
/// Plain text export mime type.
pub const MIME_TEXT: &str = "text/plain";

/// Recognition results keyed by mime type. Payloads are opaque to the editor.
pub type Exports = BTreeMap<String, serde_json::Value>;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Geometry test used by the eraser to decide which strokes a point touches.
pub trait HitTester {
    fn hits(&self, stroke: &Stroke, point: Point) -> bool;
}

/// Hit test against the stroke polyline, widened by half the pen width plus a tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHitTester {
    pub tolerance: f64,
}

impl Default for SegmentHitTester {
    fn default() -> Self {
        Self { tolerance: 2.0 }
    }
}

impl HitTester for SegmentHitTester {
    fn hits(&self, stroke: &Stroke, point: Point) -> bool {
        stroke.distance_to(point) <= self.tolerance + stroke.style().width / 2.0
    }
}

/// The scene edited by one editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub width: f64,
    pub height: f64,
    strokes: Vec<Stroke>,
    #[serde(skip)]
    current_stroke: Option<Stroke>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<Exports>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converts: Option<Exports>,
    creation_time: u64,
    modification_date: u64,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(100.0, 100.0)
    }
}

impl Model {
    /// Create an empty scene.
    pub fn new(width: f64, height: f64) -> Self {
        let now = now_millis();
        Self {
            width,
            height,
            strokes: Vec::new(),
            current_stroke: None,
            exports: None,
            converts: None,
            creation_time: now,
            modification_date: now,
        }
    }

    /// Advance the modification date. Strictly increasing even when the clock is not.
    fn touch(&mut self) {
        self.modification_date = now_millis().max(self.modification_date + 1);
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.current_stroke.as_ref()
    }

    pub fn modification_date(&self) -> u64 {
        self.modification_date
    }

    pub fn creation_time(&self) -> u64 {
        self.creation_time
    }

    /// Check if the scene holds no sealed strokes.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Get the number of sealed strokes.
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Open a new current stroke.
    pub fn init_current_stroke(
        &mut self,
        point: PointerSample,
        pointer_id: i64,
        pointer_type: PointerType,
        style: PenStyle,
    ) -> InkResult<()> {
        if self.current_stroke.is_some() {
            return Err(StateError::CurrentStrokeOpen.into());
        }
        self.current_stroke = Some(Stroke::begin(point, pointer_id, pointer_type, style)?);
        self.touch();
        Ok(())
    }

    /// Append a sample to the current stroke.
    pub fn append_to_current_stroke(&mut self, point: PointerSample) -> InkResult<()> {
        let stroke = self.current_stroke.as_mut().ok_or(StateError::NoCurrentStroke)?;
        stroke.append(point)?;
        self.touch();
        Ok(())
    }

    /// Seal the current stroke and move it into the scene.
    pub fn end_current_stroke(
        &mut self,
        point: PointerSample,
        style: Option<PenStyle>,
    ) -> InkResult<()> {
        let stroke = self.current_stroke.as_mut().ok_or(StateError::NoCurrentStroke)?;
        stroke.seal(point, style)?;
        if let Some(stroke) = self.current_stroke.take() {
            self.strokes.push(stroke);
        }
        self.touch();
        Ok(())
    }

    pub(crate) fn discard_current_stroke_silently(&mut self) {
        self.current_stroke = None;
    }

    /// Remove every sealed stroke hit by `point`.
    ///
    /// The modification date only moves when something was removed.
    pub fn remove_strokes_from_point(
        &mut self,
        point: Point,
        tester: &dyn HitTester,
    ) -> Vec<Stroke> {
        let (removed, kept): (Vec<Stroke>, Vec<Stroke>) = std::mem::take(&mut self.strokes)
            .into_iter()
            .partition(|stroke| tester.hits(stroke, point));
        self.strokes = kept;
        if !removed.is_empty() {
            self.touch();
        }
        removed
    }

    /// Insert an already sealed stroke.
    pub fn add_stroke(&mut self, mut stroke: Stroke) -> InkResult<()> {
        if stroke.is_empty() {
            return Err(InvalidInputError::EmptyStroke.into());
        }
        stroke.sealed = true;
        self.strokes.push(stroke);
        self.touch();
        Ok(())
    }

    /// Remove all strokes, including the current one.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.current_stroke = None;
        self.exports = None;
        self.converts = None;
        self.touch();
    }

    /// Change the scene size. Not a content edit.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Serialize the scene to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

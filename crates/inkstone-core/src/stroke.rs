//! Ink strokes: ordered pointer samples with a fixed pen style.

use crate::error::{InkError, InkResult, InvalidInputError, StateError};
use crate::style::PenStyle;
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stroke.
pub type StrokeId = String;

/// Kind of device that produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerType {
    Mouse,
    #[default]
    Pen,
    Touch,
    Eraser,
}

/// A single captured pointer sample in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    /// Timestamp in milliseconds, or the sample index for imported strokes.
    pub t: f64,
    /// Pressure, 1.0 when the device does not report it.
    #[serde(default = "default_pressure")]
    pub p: f64,
}

fn default_pressure() -> f64 {
    1.0
}

impl PointerSample {
    pub fn new(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t, p: 1.0 }
    }

    pub fn with_pressure(mut self, p: f64) -> Self {
        self.p = p;
        self
    }

    /// Check that both coordinates are finite.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        if !self.x.is_finite() {
            return Err(InvalidInputError::NonFiniteCoordinate { axis: 'x', value: self.x });
        }
        if !self.y.is_finite() {
            return Err(InvalidInputError::NonFiniteCoordinate { axis: 'y', value: self.y });
        }
        Ok(())
    }

    pub fn to_point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A freehand stroke.
///
/// A stroke is open while it accepts samples and sealed once the final sample of the
/// gesture has been appended. Sealed strokes are never mutated again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StrokeRecord")]
pub struct Stroke {
    pub(crate) id: StrokeId,
    pub(crate) pointer_id: i64,
    pub(crate) pointer_type: PointerType,
    pub(crate) style: PenStyle,
    pub(crate) pointers: Vec<PointerSample>,
    pub(crate) sealed: bool,
}

/// Serialized form of a stroke, checked before it becomes a [`Stroke`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StrokeRecord {
    id: StrokeId,
    pointer_id: i64,
    pointer_type: PointerType,
    style: PenStyle,
    pointers: Vec<PointerSample>,
    #[serde(default = "sealed_on_load")]
    sealed: bool,
}

// Strokes read back from a saved scene are committed data.
fn sealed_on_load() -> bool {
    true
}

impl TryFrom<StrokeRecord> for Stroke {
    type Error = InkError;

    fn try_from(record: StrokeRecord) -> InkResult<Self> {
        if !record.sealed {
            return Err(InvalidInputError::OpenStroke.into());
        }
        let stroke = Stroke::from_samples(
            record.pointers,
            record.pointer_id,
            record.pointer_type,
            record.style,
        )?;
        Ok(stroke.with_id(record.id))
    }
}

fn new_stroke_id() -> StrokeId {
    format!("stroke-{}", Uuid::new_v4())
}

impl Stroke {
    /// Create an open stroke seeded with one sample.
    pub fn begin(
        point: PointerSample,
        pointer_id: i64,
        pointer_type: PointerType,
        style: PenStyle,
    ) -> InkResult<Self> {
        point.validate()?;
        Ok(Self {
            id: new_stroke_id(),
            pointer_id,
            pointer_type,
            style,
            pointers: vec![point],
            sealed: false,
        })
    }

    /// Build a sealed stroke from already captured samples.
    pub fn from_samples(
        pointers: Vec<PointerSample>,
        pointer_id: i64,
        pointer_type: PointerType,
        style: PenStyle,
    ) -> InkResult<Self> {
        if pointers.is_empty() {
            return Err(InvalidInputError::EmptyStroke.into());
        }
        for sample in &pointers {
            sample.validate()?;
        }
        Ok(Self {
            id: new_stroke_id(),
            pointer_id,
            pointer_type,
            style,
            pointers,
            sealed: true,
        })
    }

    /// Replace the generated id, e.g. with one supplied by an import.
    pub fn with_id(mut self, id: impl Into<StrokeId>) -> Self {
        self.id = id.into();
        self
    }

    /// Append a sample to an open stroke.
    pub fn append(&mut self, point: PointerSample) -> InkResult<()> {
        if self.sealed {
            return Err(StateError::StrokeSealed.into());
        }
        point.validate()?;
        self.pointers.push(point);
        Ok(())
    }

    /// Append the final sample and close the stroke.
    ///
    /// `style` overrides the style chosen at `begin` when given.
    pub fn seal(&mut self, point: PointerSample, style: Option<PenStyle>) -> InkResult<()> {
        self.append(point)?;
        if let Some(style) = style {
            self.style = style;
        }
        self.sealed = true;
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pointer_id(&self) -> i64 {
        self.pointer_id
    }

    pub fn pointer_type(&self) -> PointerType {
        self.pointer_type
    }

    pub fn style(&self) -> &PenStyle {
        &self.style
    }

    pub fn pointers(&self) -> &[PointerSample] {
        &self.pointers
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Get the number of samples.
    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    /// Check if the stroke has no samples.
    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    /// Bounding box of the samples, not including the pen width.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.pointers.first() else {
            return Rect::ZERO;
        };
        self.pointers
            .iter()
            .skip(1)
            .fold(Rect::from_points(first.to_point(), first.to_point()), |rect, p| {
                rect.union_pt(p.to_point())
            })
    }

    /// Polyline through the samples.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.pointers.iter().map(PointerSample::to_point);
        if let Some(first) = points.next() {
            path.move_to(first);
            for point in points {
                path.line_to(point);
            }
        }
        path
    }

    /// Shortest distance from `point` to the stroke's polyline.
    pub fn distance_to(&self, point: Point) -> f64 {
        match self.pointers.as_slice() {
            [] => f64::INFINITY,
            [only] => only.to_point().distance(point),
            samples => samples
                .windows(2)
                .map(|pair| segment_distance(point, pair[0].to_point(), pair[1].to_point()))
                .fold(f64::INFINITY, f64::min),
        }
    }
}

/// Distance from a point to the segment `start..end`.
fn segment_distance(point: Point, start: Point, end: Point) -> f64 {
    let line_vec: Vec2 = end - start;
    let line_len_sq = line_vec.hypot2();
    if line_len_sq < f64::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    point.distance(start + line_vec * t)
}

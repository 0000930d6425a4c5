//! Programmatic stroke import.
//!
//! Descriptors are validated stroke by stroke: one bad pointer rejects its whole stroke,
//! and every rejection is reported together once the batch has been processed.

use inkstone_core::{InvalidInputError, PenStyle, PointerSample, PointerType, Stroke};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A pointer as supplied by the host. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointDescriptor {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub t: Option<f64>,
    pub p: Option<f64>,
}

impl PointDescriptor {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }
}

/// A stroke as supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeDescriptor {
    pub id: Option<String>,
    pub pointer_id: Option<i64>,
    pub pointer_type: Option<PointerType>,
    pub style: Option<PenStyle>,
    #[serde(default)]
    pub pointers: Option<Vec<Option<PointDescriptor>>>,
}

impl StrokeDescriptor {
    pub fn from_points(points: impl IntoIterator<Item = PointDescriptor>) -> Self {
        Self {
            pointers: Some(points.into_iter().map(Some).collect()),
            ..Self::default()
        }
    }
}

/// Why a stroke was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportIssueKind {
    NoPointers,
    MissingPointer,
    MissingX,
    MissingY,
    Invalid(InvalidInputError),
}

/// One rejection. `stroke_index` is 1-based, `pointer_index` 0-based.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportIssue {
    pub stroke_index: usize,
    pub pointer_index: Option<usize>,
    pub kind: ImportIssueKind,
}

impl fmt::Display for ImportIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stroke = self.stroke_index;
        let at = self.pointer_index.unwrap_or_default();
        match &self.kind {
            ImportIssueKind::NoPointers => write!(f, "stroke {stroke} has no pointers"),
            ImportIssueKind::MissingPointer => write!(f, "stroke {stroke} has no pointer at {at}"),
            ImportIssueKind::MissingX => write!(f, "stroke {stroke} has no x at pointer at {at}"),
            ImportIssueKind::MissingY => write!(f, "stroke {stroke} has no y at pointer at {at}"),
            ImportIssueKind::Invalid(err) => write!(f, "stroke {stroke} pointer {at}: {err}"),
        }
    }
}

/// Aggregate report for a batch that rejected at least one stroke.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} import issue(s), {added} stroke(s) added: {}", .issues.len(), join_issues(.issues))]
pub struct ImportError {
    /// Strokes from the batch that were committed anyway.
    pub added: usize,
    pub issues: Vec<ImportIssue>,
}

fn join_issues(issues: &[ImportIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Validate descriptors into sealed strokes, collecting every issue.
pub fn prepare_strokes(
    descriptors: &[StrokeDescriptor],
    default_style: &PenStyle,
) -> (Vec<Stroke>, Vec<ImportIssue>) {
    let mut strokes = Vec::new();
    let mut issues = Vec::new();

    for (index, descriptor) in descriptors.iter().enumerate() {
        let stroke_index = index + 1;
        let pointers = match descriptor.pointers.as_deref() {
            Some(pointers) if !pointers.is_empty() => pointers,
            _ => {
                issues.push(ImportIssue {
                    stroke_index,
                    pointer_index: None,
                    kind: ImportIssueKind::NoPointers,
                });
                continue;
            }
        };

        let mut samples = Vec::with_capacity(pointers.len());
        let mut rejected = false;
        for (pointer_index, pointer) in pointers.iter().enumerate() {
            match to_sample(pointer.as_ref(), pointer_index) {
                Ok(sample) => samples.push(sample),
                Err(kind) => {
                    issues.push(ImportIssue {
                        stroke_index,
                        pointer_index: Some(pointer_index),
                        kind,
                    });
                    rejected = true;
                }
            }
        }
        if rejected {
            continue;
        }

        let stroke = Stroke::from_samples(
            samples,
            descriptor.pointer_id.unwrap_or(1),
            descriptor.pointer_type.unwrap_or_default(),
            descriptor.style.clone().unwrap_or_else(|| default_style.clone()),
        );
        match stroke {
            Ok(stroke) => match &descriptor.id {
                Some(id) => strokes.push(stroke.with_id(id.clone())),
                None => strokes.push(stroke),
            },
            Err(err) => {
                log::warn!("stroke {} rejected: {}", stroke_index, err);
                issues.push(ImportIssue {
                    stroke_index,
                    pointer_index: None,
                    kind: ImportIssueKind::NoPointers,
                });
            }
        }
    }

    (strokes, issues)
}

fn to_sample(
    pointer: Option<&PointDescriptor>,
    index: usize,
) -> Result<PointerSample, ImportIssueKind> {
    let pointer = pointer.ok_or(ImportIssueKind::MissingPointer)?;
    let x = pointer.x.ok_or(ImportIssueKind::MissingX)?;
    let y = pointer.y.ok_or(ImportIssueKind::MissingY)?;
    let mut sample = PointerSample::new(x, y, pointer.t.unwrap_or(index as f64));
    if let Some(p) = pointer.p {
        sample = sample.with_pressure(p);
    }
    sample.validate().map_err(ImportIssueKind::Invalid)?;
    Ok(sample)
}

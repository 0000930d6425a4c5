//! Error taxonomy for ink data and editing protocol violations.

use thiserror::Error;

/// Malformed sample or stroke data. Never applied to the model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("coordinate {axis} is not finite ({value})")]
    NonFiniteCoordinate { axis: char, value: f64 },
    #[error("missing {axis} coordinate")]
    MissingCoordinate { axis: char },
    #[error("stroke has no pointers")]
    EmptyStroke,
    #[error("stroke in the scene is not sealed")]
    OpenStroke,
}

/// Protocol violations: the caller sequenced operations incorrectly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("no current stroke")]
    NoCurrentStroke,
    #[error("a current stroke is already open")]
    CurrentStrokeOpen,
    #[error("stroke is sealed")]
    StrokeSealed,
    #[error("a gesture is in progress")]
    GestureInProgress,
    #[error("nothing to undo")]
    HistoryBottom,
    #[error("nothing to redo")]
    HistoryTop,
}

/// Errors raised by core operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InkError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
    #[error("invalid state: {0}")]
    State(#[from] StateError),
}

/// Result type for core operations.
pub type InkResult<T> = Result<T, InkError>;

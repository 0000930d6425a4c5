//! Inkstone Core Library
//!
//! Platform-agnostic ink primitives, scene model and history for the Inkstone editor.

pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod intention;
pub mod model;
pub mod stroke;
pub mod style;

pub use config::EditorConfiguration;
pub use error::{InkError, InkResult, InvalidInputError, StateError};
pub use history::{UndoRedoContext, UndoRedoManager};
pub use input::{GrabbedEvent, PointerEvent, PointerGrabber, PointerPhase};
pub use intention::{EditorMode, GestureEffect, Intention, UnknownModeError, apply_gesture_event};
pub use model::{Exports, HitTester, Model, SegmentHitTester, MIME_JIIX, MIME_TEXT};
pub use stroke::{PointerSample, PointerType, Stroke, StrokeId};
pub use style::{ParseColorError, PenStyle, SerializableColor};

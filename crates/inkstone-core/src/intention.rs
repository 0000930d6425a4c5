//! Editing intention and the per-gesture state machine.

use crate::error::InkResult;
use crate::input::{GrabbedEvent, PointerPhase};
use crate::model::{HitTester, Model};
use crate::stroke::PointerType;
use crate::style::PenStyle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a gesture does to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intention {
    #[default]
    Write,
    Erase,
}

/// Input mode selected by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    Mouse,
    #[default]
    Pen,
    Touch,
    Eraser,
}

impl EditorMode {
    pub fn intention(self) -> Intention {
        match self {
            EditorMode::Eraser => Intention::Erase,
            EditorMode::Mouse | EditorMode::Pen | EditorMode::Touch => Intention::Write,
        }
    }

    /// Pointer type recorded on strokes drawn in this mode.
    pub fn pointer_type(self) -> PointerType {
        match self {
            EditorMode::Mouse => PointerType::Mouse,
            EditorMode::Pen => PointerType::Pen,
            EditorMode::Touch => PointerType::Touch,
            EditorMode::Eraser => PointerType::Eraser,
        }
    }
}

/// Error returned for an unrecognised mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown editor mode: {0:?}")]
pub struct UnknownModeError(pub String);

impl FromStr for EditorMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mouse" => Ok(EditorMode::Mouse),
            "pen" => Ok(EditorMode::Pen),
            "touch" => Ok(EditorMode::Touch),
            "eraser" => Ok(EditorMode::Eraser),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditorMode::Mouse => "mouse",
            EditorMode::Pen => "pen",
            EditorMode::Touch => "touch",
            EditorMode::Eraser => "eraser",
        };
        f.write_str(name)
    }
}

/// Follow-up the orchestrator owes after a gesture event was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEffect {
    /// Nothing changed.
    None,
    /// The open stroke grew; redraw it.
    DrawPendingStroke,
    /// Sealed strokes were removed; redraw the scene.
    DrawModel,
    /// A stroke was sealed; record a checkpoint.
    Commit,
    /// An erase gesture ended; record a checkpoint only if the scene changed.
    CommitIfChanged,
}

/// Apply one gesture event to the model.
///
/// `intention` is the one latched when the gesture began.
pub fn apply_gesture_event(
    intention: Intention,
    event: &GrabbedEvent,
    style: &PenStyle,
    model: &mut Model,
    tester: &dyn HitTester,
) -> InkResult<GestureEffect> {
    let point = event.sample.to_point();
    let effect = match (intention, event.phase) {
        (Intention::Write, PointerPhase::Down) => {
            model.init_current_stroke(
                event.sample,
                event.pointer_id,
                event.pointer_type,
                style.clone(),
            )?;
            GestureEffect::DrawPendingStroke
        }
        (Intention::Write, PointerPhase::Move) => {
            model.append_to_current_stroke(event.sample)?;
            GestureEffect::DrawPendingStroke
        }
        (Intention::Write, PointerPhase::Up) => {
            model.end_current_stroke(event.sample, None)?;
            GestureEffect::Commit
        }
        (Intention::Erase, PointerPhase::Down | PointerPhase::Move) => {
            event.sample.validate()?;
            if model.remove_strokes_from_point(point, tester).is_empty() {
                GestureEffect::None
            } else {
                GestureEffect::DrawModel
            }
        }
        (Intention::Erase, PointerPhase::Up) => {
            event.sample.validate()?;
            model.remove_strokes_from_point(point, tester);
            GestureEffect::CommitIfChanged
        }
    };
    Ok(effect)
}

//! Editor configuration.
//!
//! Every section is optional in the JSON document; missing keys fall back to defaults.

use crate::history::DEFAULT_MAX_STACK_SIZE;
use crate::style::PenStyle;
use serde::{Deserialize, Serialize};

/// History settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UndoRedoConfiguration {
    /// Maximum number of snapshots kept. Clamped to at least 1.
    pub max_stack_size: usize,
}

impl Default for UndoRedoConfiguration {
    fn default() -> Self {
        Self {
            max_stack_size: DEFAULT_MAX_STACK_SIZE,
        }
    }
}

/// Pointer capture settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrabberConfiguration {
    /// Decimals kept on x/y.
    pub xy_float_precision: u32,
    /// Decimals kept on timestamps.
    pub timestamp_float_precision: u32,
}

/// Scene geometry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderingConfiguration {
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for RenderingConfiguration {
    fn default() -> Self {
        Self {
            min_width: 100.0,
            min_height: 100.0,
        }
    }
}

/// Eraser settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EraserConfiguration {
    /// Extra distance, beyond half the pen width, at which a stroke counts as hit.
    pub tolerance: f64,
}

impl Default for EraserConfiguration {
    fn default() -> Self {
        Self { tolerance: 2.0 }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfiguration {
    #[serde(rename = "undo-redo")]
    pub undo_redo: UndoRedoConfiguration,
    pub grabber: GrabberConfiguration,
    pub rendering: RenderingConfiguration,
    pub eraser: EraserConfiguration,
    #[serde(rename = "penStyle")]
    pub pen_style: PenStyle,
}

impl EditorConfiguration {
    /// Parse a possibly partial configuration document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Clamp a requested scene size to the configured minimums.
    pub fn clamp_size(&self, width: f64, height: f64) -> (f64, f64) {
        (
            width.max(self.rendering.min_width),
            height.max(self.rendering.min_height),
        )
    }
}

//! Linear undo/redo history of scene snapshots.

use crate::error::StateError;
use crate::model::Model;
use serde::{Deserialize, Serialize};

/// Default maximum number of snapshots kept.
pub const DEFAULT_MAX_STACK_SIZE: usize = 50;

/// Read-only view of the history, handed to the notification layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoRedoContext {
    /// The displayed snapshot holds no strokes.
    pub empty: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub stack_len: usize,
    pub position: usize,
}

/// Bounded linear history.
///
/// `position` always designates the snapshot matching the displayed scene. Pushing after
/// an undo discards the redo branch. Snapshots are independent copies of the live model.
#[derive(Debug, Clone)]
pub struct UndoRedoManager {
    stack: Vec<Model>,
    position: usize,
    max_size: usize,
}

impl UndoRedoManager {
    /// Start a history whose single entry is a copy of `initial`.
    pub fn new(initial: &Model, max_size: usize) -> Self {
        Self {
            stack: vec![snapshot(initial)],
            position: 0,
            max_size: max_size.max(1),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position + 1 < self.stack.len()
    }

    /// The snapshot matching the displayed scene.
    pub fn current(&self) -> &Model {
        &self.stack[self.position]
    }

    pub fn context(&self) -> UndoRedoContext {
        UndoRedoContext {
            empty: self.current().is_empty(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            stack_len: self.stack.len(),
            position: self.position,
        }
    }

    /// Record a new checkpoint after the current position.
    pub fn add_model_to_stack(&mut self, model: &Model) {
        self.stack.truncate(self.position + 1);
        self.stack.push(snapshot(model));
        self.position = self.stack.len() - 1;

        // Evict oldest entries past capacity
        if self.stack.len() > self.max_size {
            let excess = self.stack.len() - self.max_size;
            self.stack.drain(..excess);
            self.position -= excess;
        }
        log::debug!(
            "history checkpoint: position {} of {}",
            self.position,
            self.stack.len()
        );
    }

    /// Replace the snapshot at the current position, keeping the redo branch.
    pub fn update_model_in_stack(&mut self, model: &Model) {
        self.stack[self.position] = snapshot(model);
    }

    /// Step back. Fails at the bottom of the history.
    pub fn try_undo(&mut self) -> Result<Model, StateError> {
        if !self.can_undo() {
            return Err(StateError::HistoryBottom);
        }
        self.position -= 1;
        Ok(self.stack[self.position].clone())
    }

    /// Step forward. Fails at the top of the history.
    pub fn try_redo(&mut self) -> Result<Model, StateError> {
        if !self.can_redo() {
            return Err(StateError::HistoryTop);
        }
        self.position += 1;
        Ok(self.stack[self.position].clone())
    }

    /// Step back, or return the current snapshot when there is nothing to undo.
    pub fn undo(&mut self) -> Model {
        self.try_undo().unwrap_or_else(|_| self.current().clone())
    }

    /// Step forward, or return the current snapshot when there is nothing to redo.
    pub fn redo(&mut self) -> Model {
        self.try_redo().unwrap_or_else(|_| self.current().clone())
    }
}

// An open stroke is never history content.
fn snapshot(model: &Model) -> Model {
    let mut copy = model.clone();
    copy.discard_current_stroke_silently();
    copy
}

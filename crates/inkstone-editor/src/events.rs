//! Notifications emitted to the host.

use inkstone_core::{Exports, UndoRedoContext};
use std::sync::mpsc::Sender;

/// Events from the editor
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Session initialised
    Loaded,
    /// History moved: a checkpoint was recorded, or undo/redo happened
    Changed { context: UndoRedoContext, can_clear: bool },
    /// Fresh exports are available
    Exported(Exports),
    /// Conversion finished
    Converted(Exports),
    /// Strokes were imported
    Imported(Exports),
    /// Scene was cleared
    Cleared,
    /// `false` while a backend request is pending, `true` once it settles
    Idle(bool),
    /// A recoverable error occurred
    Error(String),
}

impl EditorEvent {
    pub fn changed(context: UndoRedoContext) -> Self {
        EditorEvent::Changed {
            context,
            can_clear: !context.empty,
        }
    }
}

/// Sink for editor events.
pub trait EventEmitter {
    fn emit(&self, event: EditorEvent);
}

impl EventEmitter for Sender<EditorEvent> {
    fn emit(&self, event: EditorEvent) {
        if self.send(event).is_err() {
            log::debug!("event receiver dropped");
        }
    }
}

/// Emitter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmitter;

impl EventEmitter for NoopEmitter {
    fn emit(&self, _event: EditorEvent) {}
}

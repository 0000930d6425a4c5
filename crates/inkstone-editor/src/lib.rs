//! Inkstone Editor Library
//!
//! The local editor behaviors: turns pointer gestures into scene edits, records history
//! checkpoints, and synchronises exports with a recognition backend.

pub mod backend;
pub mod behaviors;
pub mod error;
pub mod events;
pub mod import;
pub mod session;

pub use backend::{BackendError, BackendResult, BoxFuture, LocalBackend, RecognitionBackend};
pub use behaviors::LocalBehaviors;
pub use error::{BehaviorsError, BehaviorsResult};
pub use events::{EditorEvent, EventEmitter, NoopEmitter};
pub use import::{ImportError, ImportIssue, ImportIssueKind, PointDescriptor, StrokeDescriptor};
pub use session::{SessionCommand, SessionReport, SessionScript, run_session};

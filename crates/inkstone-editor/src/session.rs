//! Scripted editor sessions.
//!
//! A session script is a JSON document describing the surface size, the configuration and
//! the sequence of host calls to replay against a [`LocalBehaviors`].

use crate::backend::RecognitionBackend;
use crate::behaviors::LocalBehaviors;
use crate::import::StrokeDescriptor;
use inkstone_core::{EditorConfiguration, PenStyle, PointerEvent};
use inkstone_render::Renderer;
use serde::{Deserialize, Serialize};

/// One host call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionCommand {
    Pointer(PointerEvent),
    Mode {
        mode: String,
    },
    PenStyle {
        style: PenStyle,
    },
    Undo,
    Redo,
    Clear,
    Resize {
        width: f64,
        height: f64,
    },
    Import {
        strokes: Vec<StrokeDescriptor>,
    },
    Export {
        #[serde(default, rename = "mimeTypes")]
        mime_types: Vec<String>,
    },
    Convert,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionScript {
    #[serde(default)]
    pub configuration: EditorConfiguration,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub commands: Vec<SessionCommand>,
}

impl SessionScript {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Commands replayed
    pub commands: usize,
    /// Errors returned by individual commands, in order
    pub errors: Vec<String>,
}

impl SessionReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Initialise `behaviors` with the script's size and replay every command.
///
/// A failing command is recorded in the report and the replay goes on.
pub async fn run_session<R, B>(
    behaviors: &mut LocalBehaviors<R, B>,
    script: &SessionScript,
) -> SessionReport
where
    R: Renderer,
    B: RecognitionBackend,
{
    log::info!("replaying {} commands", script.commands.len());
    behaviors.init(script.width, script.height);

    let mut report = SessionReport::default();
    for (index, command) in script.commands.iter().enumerate() {
        let result = match command {
            SessionCommand::Pointer(event) => behaviors.handle_pointer_event(event).await,
            SessionCommand::Mode { mode } => {
                behaviors.set_mode_by_name(mode);
                Ok(())
            }
            SessionCommand::PenStyle { style } => {
                behaviors.set_pen_style(style.clone());
                Ok(())
            }
            SessionCommand::Undo => behaviors.undo().map(|_| ()),
            SessionCommand::Redo => behaviors.redo().map(|_| ()),
            SessionCommand::Clear => behaviors.clear().map(|_| ()),
            SessionCommand::Resize { width, height } => {
                behaviors.resize(*width, *height);
                Ok(())
            }
            SessionCommand::Import { strokes } => {
                behaviors.import_point_events(strokes).await.map(|_| ())
            }
            SessionCommand::Export { mime_types } => behaviors.export(mime_types).await.map(|_| ()),
            SessionCommand::Convert => behaviors.convert().await.map(|_| ()),
        };
        report.commands += 1;
        if let Err(err) = result {
            log::warn!("command {} failed: {}", index, err);
            report.errors.push(format!("command {}: {}", index, err));
        }
    }
    log::debug!("session done with {} errors", report.errors.len());
    report
}

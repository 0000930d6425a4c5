//! Pointer input: raw events from the host and the grabber that sanitises them.

use crate::stroke::{PointerSample, PointerType};
use serde::{Deserialize, Serialize};

/// Phase of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

fn default_pointer_id() -> i64 {
    1
}

fn default_pressure() -> f64 {
    1.0
}

/// Pointer event as delivered by the host, in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub phase: PointerPhase,
    #[serde(default = "default_pointer_id")]
    pub pointer_id: i64,
    #[serde(default)]
    pub pointer_type: PointerType,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub t: f64,
    #[serde(default = "default_pressure")]
    pub p: f64,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            phase,
            pointer_id: default_pointer_id(),
            pointer_type: PointerType::default(),
            x,
            y,
            t: 0.0,
            p: 1.0,
        }
    }

    pub fn down(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    pub fn with_pointer(mut self, pointer_id: i64, pointer_type: PointerType) -> Self {
        self.pointer_id = pointer_id;
        self.pointer_type = pointer_type;
        self
    }

    pub fn at_time(mut self, t: f64) -> Self {
        self.t = t;
        self
    }
}

/// Event accepted by the grabber, ready for the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabbedEvent {
    pub phase: PointerPhase,
    pub pointer_id: i64,
    pub pointer_type: PointerType,
    pub sample: PointerSample,
}

/// Serialises gestures per pointer id and rounds samples to the configured precision.
///
/// Only one gesture is open at a time. Events from other pointers while it is open are
/// dropped, as are moves and ups that belong to no open gesture.
#[derive(Debug, Clone, Default)]
pub struct PointerGrabber {
    xy_precision: u32,
    timestamp_precision: u32,
    active: Option<i64>,
}

impl PointerGrabber {
    pub fn new(xy_precision: u32, timestamp_precision: u32) -> Self {
        Self {
            xy_precision,
            timestamp_precision,
            active: None,
        }
    }

    /// Pointer id of the open gesture.
    pub fn active_pointer(&self) -> Option<i64> {
        self.active
    }

    /// Forget the open gesture.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Filter one host event. Returns `None` when it must be dropped.
    pub fn grab(&mut self, event: &PointerEvent) -> Option<GrabbedEvent> {
        match (event.phase, self.active) {
            (PointerPhase::Down, Some(active)) if active != event.pointer_id => {
                log::warn!(
                    "pointer {} down ignored: gesture of pointer {} still open",
                    event.pointer_id,
                    active
                );
                return None;
            }
            (PointerPhase::Down, Some(active)) => {
                log::warn!("pointer {} down without up, restarting gesture", active);
            }
            (PointerPhase::Down, None) => {}
            (PointerPhase::Move | PointerPhase::Up, Some(active))
                if active == event.pointer_id => {}
            (phase, _) => {
                log::debug!("pointer {} {:?} ignored: no open gesture", event.pointer_id, phase);
                return None;
            }
        }

        self.active = match event.phase {
            PointerPhase::Up => None,
            PointerPhase::Down | PointerPhase::Move => Some(event.pointer_id),
        };

        Some(GrabbedEvent {
            phase: event.phase,
            pointer_id: event.pointer_id,
            pointer_type: event.pointer_type,
            sample: PointerSample {
                x: round_to(event.x, self.xy_precision),
                y: round_to(event.y, self.xy_precision),
                t: round_to(event.t, self.timestamp_precision),
                p: event.p,
            },
        })
    }
}

/// Round `value` to `decimals` fractional digits.
fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals.min(15) as i32);
    (value * factor).round() / factor
}

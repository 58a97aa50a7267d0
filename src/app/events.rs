//! Outbound rig events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them: log to the console, forward to remote
//! clients as JSON lines, etc.

use serde::Serialize;

use super::capture::CaptureMode;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RigEvent {
    /// The active input scope changed.
    ScopeChanged { from: String, to: String },

    /// A capture session began.
    CaptureStarted { mode: CaptureMode },

    /// A capture session ended.  `elapsed_secs` excludes paused time.
    CaptureStopped { elapsed_secs: Option<f64> },

    /// The session timer was paused or resumed.
    CapturePaused { paused: bool },

    /// One altimeter reading.
    AltitudeSampled { elapsed_secs: f64, altitude_ft: f32 },

    /// One still was stored.
    PhotoCaptured { location: String },

    VideoStarted,

    VideoStopped,

    /// The pan/tilt head advanced one step.
    PanTiltStepped,
}

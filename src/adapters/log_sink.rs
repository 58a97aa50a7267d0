//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every [`RigEvent`] to the process
//! log.  The remote adapter implements the same trait to forward events
//! to connected clients.

use log::info;

use crate::app::events::RigEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`RigEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &RigEvent) {
        match event {
            RigEvent::ScopeChanged { from, to } => {
                info!("SCOPE | {} -> {}", from, to);
            }
            RigEvent::CaptureStarted { mode } => {
                info!("CAPTURE | started, mode={:?}", mode);
            }
            RigEvent::CaptureStopped { elapsed_secs } => match elapsed_secs {
                Some(secs) => info!("CAPTURE | stopped after {:.1}s", secs),
                None => info!("CAPTURE | stopped"),
            },
            RigEvent::CapturePaused { paused } => {
                info!("CAPTURE | {}", if *paused { "paused" } else { "resumed" });
            }
            RigEvent::AltitudeSampled {
                elapsed_secs,
                altitude_ft,
            } => {
                info!("ALT | t={:.1}s | {:.1}ft", elapsed_secs, altitude_ft);
            }
            RigEvent::PhotoCaptured { location } => {
                info!("PHOTO | {}", location);
            }
            RigEvent::VideoStarted => info!("VIDEO | recording"),
            RigEvent::VideoStopped => info!("VIDEO | stopped"),
            RigEvent::PanTiltStepped => info!("PAN | step"),
        }
    }
}

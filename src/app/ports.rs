//! Port traits: the hexagonal boundary between the control core and the rig.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Menu / Timer / Controller (domain)
//! ```
//!
//! Camera driver calls, display rendering, servo PWM, barometer registers,
//! settings persistence and power management all live behind these traits.
//! The domain consumes them via generics, so the core never touches
//! hardware directly and every path can be driven by the mocks in
//! `tests/integration/mock_hw.rs`.

use core::time::Duration;

use log::warn;

use crate::error::{HardwareError, SettingsError};

use super::events::RigEvent;

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: clock → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source consumed by the [`Timer`](crate::timer::Timer).
pub trait TimePort {
    /// Time since an arbitrary fixed origin.  Must never go backwards.
    fn now(&self) -> Duration;
}

// ───────────────────────────────────────────────────────────────
// Settings port (driven adapter: domain ↔ persistent settings)
// ───────────────────────────────────────────────────────────────

/// Key-value settings store.  The core never parses or persists settings
/// itself; values travel as their stored text.
pub trait SettingsPort {
    /// Value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Value stored under `key`, or `default` (logged) when absent.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| {
            warn!("Setting '{}' not found, using default '{}'", key, default);
            default.to_string()
        })
    }

    /// Store `value` under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;

    /// Replace every setting with its factory default.
    fn load_defaults(&mut self) -> Result<(), SettingsError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → screen)
// ───────────────────────────────────────────────────────────────

/// Renders menu text or image directives.  Layout (single line, two-line
/// "Header: message", raw image path) is the adapter's business.
pub trait DisplayPort {
    fn print_message(&mut self, message: &str);
}

// ───────────────────────────────────────────────────────────────
// Power / system port
// ───────────────────────────────────────────────────────────────

/// System-level actions the menu can trigger but never implements.
pub trait PowerPort {
    fn shutdown(&mut self) -> Result<(), HardwareError>;

    fn reboot(&mut self) -> Result<(), HardwareError>;

    /// Show IP / disk / network status on the display.
    fn display_system_info(&mut self) -> Result<(), HardwareError>;
}

// ───────────────────────────────────────────────────────────────
// Capture hardware ports
// ───────────────────────────────────────────────────────────────

/// Still and video capture.
pub trait CameraPort {
    /// Take one still.  `annotation` is burned into the frame when set.
    /// Returns the stored location of the image.
    fn capture_photo(&mut self, annotation: Option<&str>) -> Result<String, HardwareError>;

    fn start_video(&mut self) -> Result<(), HardwareError>;

    fn stop_video(&mut self) -> Result<(), HardwareError>;
}

/// Barometric altimeter.
pub trait AltimeterPort {
    /// Average ground pressure as the zero reference.  Called once when a
    /// capture session starts.
    fn calibrate(&mut self) -> Result<(), HardwareError>;

    /// Altitude above the calibration point, in feet.
    fn read_altitude(&mut self) -> Result<f32, HardwareError>;
}

/// Pan/tilt head.
pub trait PanTiltPort {
    /// Advance the head by one configured step.
    fn step(&mut self) -> Result<(), HardwareError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / remote clients)
// ───────────────────────────────────────────────────────────────

/// The control loop emits structured [`RigEvent`]s through this port.
/// Adapters decide where they go (console log, remote clients, …).
pub trait EventSink {
    fn emit(&mut self, event: &RigEvent);
}

// ───────────────────────────────────────────────────────────────
// Bundles
// ───────────────────────────────────────────────────────────────

/// Everything the menu state machine talks to.
pub trait MenuPorts: SettingsPort + DisplayPort + PowerPort {}

impl<T: SettingsPort + DisplayPort + PowerPort> MenuPorts for T {}

/// Everything the control loop talks to.
pub trait RigPorts: MenuPorts + CameraPort + AltimeterPort + PanTiltPort + EventSink {}

impl<T: MenuPorts + CameraPort + AltimeterPort + PanTiltPort + EventSink> RigPorts for T {}

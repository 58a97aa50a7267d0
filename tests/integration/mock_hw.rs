//! Mock rig adapter for integration tests.
//!
//! Records every port call so tests can assert on the full history
//! without touching a camera, barometer or display.  [`ManualClock`]
//! lets tests move time forward explicitly and [`FakeButton`] stands in
//! for an active-low GPIO line.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use embedded_hal::digital::{ErrorType, InputPin};
use pikite::app::events::RigEvent;
use pikite::app::ports::{
    AltimeterPort, CameraPort, DisplayPort, EventSink, PanTiltPort, PowerPort, SettingsPort,
    TimePort,
};
use pikite::config::DEFAULT_SETTINGS;
use pikite::error::{HardwareError, SettingsError};

// ── Clock ─────────────────────────────────────────────────────

/// Shared, hand-driven clock.  Clones observe the same time.
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<Duration>>);

#[allow(dead_code)]
impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl TimePort for ManualClock {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

// ── Button pin ────────────────────────────────────────────────

/// Active-low pin whose level the test controls.  Clones share the level.
#[derive(Clone, Default)]
pub struct FakeButton(Rc<Cell<bool>>);

#[allow(dead_code)]
impl FakeButton {
    pub fn set_pressed(&self, pressed: bool) {
        self.0.set(pressed);
    }
}

impl ErrorType for FakeButton {
    type Error = core::convert::Infallible;
}

impl InputPin for FakeButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }
}

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    Calibrate,
    ReadAltitude,
    Photo { annotation: Option<String> },
    StartVideo,
    StopVideo,
    PanStep,
    Shutdown,
    Reboot,
    SystemInfo,
}

// ── MockRig ───────────────────────────────────────────────────

pub struct MockRig {
    pub settings: HashMap<String, String>,
    pub messages: Vec<String>,
    pub calls: Vec<HwCall>,
    pub events: Vec<RigEvent>,
    pub altitude_ft: f32,
    /// Make `set` fail.
    pub read_only: bool,
    /// Make shutdown / reboot fail.
    pub power_fails: bool,
}

#[allow(dead_code)]
impl MockRig {
    pub fn new() -> Self {
        Self {
            settings: DEFAULT_SETTINGS
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            messages: Vec::new(),
            calls: Vec::new(),
            events: Vec::new(),
            altitude_ft: 0.0,
            read_only: false,
            power_fails: false,
        }
    }

    pub fn with_setting(mut self, key: &str, value: &str) -> Self {
        self.settings.insert(key.to_string(), value.to_string());
        self
    }

    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    pub fn count(&self, call: &HwCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn photos(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HwCall::Photo { .. }))
            .count()
    }

    /// Every `(from, to)` scope change emitted so far.
    pub fn scope_changes(&self) -> Vec<(String, String)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RigEvent::ScopeChanged { from, to } => Some((from.clone(), to.clone())),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockRig {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsPort for MockRig {
    fn get(&self, key: &str) -> Option<String> {
        self.settings.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        if self.read_only {
            return Err(SettingsError::UnknownSection(key.to_string()));
        }
        self.settings.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn load_defaults(&mut self) -> Result<(), SettingsError> {
        self.settings = DEFAULT_SETTINGS
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Ok(())
    }
}

impl DisplayPort for MockRig {
    fn print_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

impl PowerPort for MockRig {
    fn shutdown(&mut self) -> Result<(), HardwareError> {
        self.calls.push(HwCall::Shutdown);
        if self.power_fails {
            return Err(HardwareError::Unavailable("power"));
        }
        Ok(())
    }

    fn reboot(&mut self) -> Result<(), HardwareError> {
        self.calls.push(HwCall::Reboot);
        if self.power_fails {
            return Err(HardwareError::Unavailable("power"));
        }
        Ok(())
    }

    fn display_system_info(&mut self) -> Result<(), HardwareError> {
        self.calls.push(HwCall::SystemInfo);
        self.messages.push("IP: 192.168.4.1".to_string());
        Ok(())
    }
}

impl CameraPort for MockRig {
    fn capture_photo(&mut self, annotation: Option<&str>) -> Result<String, HardwareError> {
        self.calls.push(HwCall::Photo {
            annotation: annotation.map(str::to_string),
        });
        Ok(format!("mock/{}.jpg", self.photos()))
    }

    fn start_video(&mut self) -> Result<(), HardwareError> {
        self.calls.push(HwCall::StartVideo);
        Ok(())
    }

    fn stop_video(&mut self) -> Result<(), HardwareError> {
        self.calls.push(HwCall::StopVideo);
        Ok(())
    }
}

impl AltimeterPort for MockRig {
    fn calibrate(&mut self) -> Result<(), HardwareError> {
        self.calls.push(HwCall::Calibrate);
        Ok(())
    }

    fn read_altitude(&mut self) -> Result<f32, HardwareError> {
        self.calls.push(HwCall::ReadAltitude);
        Ok(self.altitude_ft)
    }
}

impl PanTiltPort for MockRig {
    fn step(&mut self) -> Result<(), HardwareError> {
        self.calls.push(HwCall::PanStep);
        Ok(())
    }
}

impl EventSink for MockRig {
    fn emit(&mut self, event: &RigEvent) {
        self.events.push(event.clone());
    }
}

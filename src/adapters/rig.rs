//! Rig adapter: bundles every concrete peripheral behind the port traits.
//!
//! The control loop is generic over [`RigPorts`](crate::app::ports::RigPorts);
//! this is the one concrete type `main` hands it.  Events fan out to the
//! console log and, when the remote listener is enabled, to connected
//! clients.

use crate::adapters::log_sink::LogEventSink;
use crate::adapters::power::SystemPower;
use crate::adapters::remote::RemoteEventSink;
use crate::adapters::settings::FileSettings;
use crate::adapters::sim::{LogDisplay, SimAltimeter, SimCamera, SimPanTilt};
use crate::app::events::RigEvent;
use crate::app::ports::{
    AltimeterPort, CameraPort, DisplayPort, EventSink, PanTiltPort, PowerPort, SettingsPort,
};
use crate::error::{HardwareError, SettingsError};

pub struct RigHardware {
    settings: FileSettings,
    display: LogDisplay,
    power: SystemPower,
    camera: SimCamera,
    altimeter: SimAltimeter,
    pan_tilt: SimPanTilt,
    log_sink: LogEventSink,
    remote: Option<RemoteEventSink>,
}

impl RigHardware {
    pub fn new(settings: FileSettings, power: SystemPower) -> Self {
        Self {
            settings,
            display: LogDisplay::new(),
            power,
            camera: SimCamera::new(),
            altimeter: SimAltimeter::default(),
            pan_tilt: SimPanTilt::default(),
            log_sink: LogEventSink::new(),
            remote: None,
        }
    }

    /// Also forward events to remote clients.
    pub fn with_remote(mut self, sink: RemoteEventSink) -> Self {
        self.remote = Some(sink);
        self
    }

    pub fn display(&self) -> &LogDisplay {
        &self.display
    }

    pub fn settings(&self) -> &FileSettings {
        &self.settings
    }
}

// ── SettingsPort ──────────────────────────────────────────────

impl SettingsPort for RigHardware {
    fn get(&self, key: &str) -> Option<String> {
        self.settings.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.settings.set(key, value)
    }

    fn load_defaults(&mut self) -> Result<(), SettingsError> {
        self.settings.load_defaults()
    }
}

// ── DisplayPort ───────────────────────────────────────────────

impl DisplayPort for RigHardware {
    fn print_message(&mut self, message: &str) {
        self.display.print_message(message);
    }
}

// ── PowerPort ─────────────────────────────────────────────────

impl PowerPort for RigHardware {
    fn shutdown(&mut self) -> Result<(), HardwareError> {
        self.display.print_message("Shutting down...");
        self.power.shutdown()
    }

    fn reboot(&mut self) -> Result<(), HardwareError> {
        self.display.print_message("Rebooting...");
        self.power.reboot()
    }

    fn display_system_info(&mut self) -> Result<(), HardwareError> {
        let info = self.power.system_info();
        for line in info.lines() {
            self.display.print_message(&line);
        }
        Ok(())
    }
}

// ── Capture hardware ──────────────────────────────────────────

impl CameraPort for RigHardware {
    fn capture_photo(&mut self, annotation: Option<&str>) -> Result<String, HardwareError> {
        self.camera.capture_photo(annotation)
    }

    fn start_video(&mut self) -> Result<(), HardwareError> {
        self.camera.start_video()
    }

    fn stop_video(&mut self) -> Result<(), HardwareError> {
        self.camera.stop_video()
    }
}

impl AltimeterPort for RigHardware {
    fn calibrate(&mut self) -> Result<(), HardwareError> {
        self.altimeter.calibrate()
    }

    fn read_altitude(&mut self) -> Result<f32, HardwareError> {
        self.altimeter.read_altitude()
    }
}

impl PanTiltPort for RigHardware {
    fn step(&mut self) -> Result<(), HardwareError> {
        self.pan_tilt.step()
    }
}

// ── EventSink ─────────────────────────────────────────────────

impl EventSink for RigHardware {
    fn emit(&mut self, event: &RigEvent) {
        self.log_sink.emit(event);
        if let Some(remote) = self.remote.as_mut() {
            remote.emit(event);
        }
    }
}

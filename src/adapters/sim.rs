//! Simulated rig peripherals.
//!
//! Stand-ins for the LCD, camera, barometer and servo head so the whole
//! control loop runs on a desktop or on a Pi without the capture hardware
//! attached.  Everything they "do" goes to the log.

use log::info;

use crate::app::ports::{AltimeterPort, CameraPort, DisplayPort, PanTiltPort};
use crate::error::HardwareError;

// ── Display ───────────────────────────────────────────────────

/// Logs every message instead of drawing it.
#[derive(Debug, Default)]
pub struct LogDisplay {
    last: Option<String>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

impl DisplayPort for LogDisplay {
    fn print_message(&mut self, message: &str) {
        info!("LCD | {}", message);
        self.last = Some(message.to_string());
    }
}

// ── Camera ────────────────────────────────────────────────────

/// Names photos the way the real camera stores them, without taking any.
#[derive(Debug)]
pub struct SimCamera {
    folder: String,
    recording: bool,
}

impl Default for SimCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl SimCamera {
    pub fn new() -> Self {
        Self {
            folder: chrono::Local::now().format("%m-%d-%Y-%H-%M").to_string(),
            recording: false,
        }
    }
}

impl CameraPort for SimCamera {
    fn capture_photo(&mut self, annotation: Option<&str>) -> Result<String, HardwareError> {
        let stamp = chrono::Local::now().format("%m-%d-%Y-%H-%M-%S%.3f");
        let location = format!("{}/{}.jpg", self.folder, stamp);
        match annotation {
            Some(text) => info!("CAMERA | {} [{}]", location, text),
            None => info!("CAMERA | {}", location),
        }
        Ok(location)
    }

    fn start_video(&mut self) -> Result<(), HardwareError> {
        if self.recording {
            return Err(HardwareError::Failed("already recording".into()));
        }
        self.recording = true;
        info!("CAMERA | recording");
        Ok(())
    }

    fn stop_video(&mut self) -> Result<(), HardwareError> {
        if !self.recording {
            return Err(HardwareError::Failed("not recording".into()));
        }
        self.recording = false;
        info!("CAMERA | stopped");
        Ok(())
    }
}

// ── Altimeter ─────────────────────────────────────────────────

/// Climbs steadily to a ceiling, like a kite on a fixed line.
#[derive(Debug)]
pub struct SimAltimeter {
    climb_ft_per_read: f32,
    ceiling_ft: f32,
    altitude_ft: f32,
}

impl Default for SimAltimeter {
    fn default() -> Self {
        Self::new(2.5, 300.0)
    }
}

impl SimAltimeter {
    pub fn new(climb_ft_per_read: f32, ceiling_ft: f32) -> Self {
        Self {
            climb_ft_per_read,
            ceiling_ft,
            altitude_ft: 0.0,
        }
    }
}

impl AltimeterPort for SimAltimeter {
    fn calibrate(&mut self) -> Result<(), HardwareError> {
        self.altitude_ft = 0.0;
        info!("ALTIMETER | zeroed");
        Ok(())
    }

    fn read_altitude(&mut self) -> Result<f32, HardwareError> {
        let reading = self.altitude_ft;
        self.altitude_ft = (self.altitude_ft + self.climb_ft_per_read).min(self.ceiling_ft);
        Ok(reading)
    }
}

// ── Pan / tilt ────────────────────────────────────────────────

/// Sweeps the pan axis in fixed steps and wraps after a full turn.
#[derive(Debug)]
pub struct SimPanTilt {
    step_deg: u16,
    angle_deg: u16,
}

impl Default for SimPanTilt {
    fn default() -> Self {
        Self::new(45)
    }
}

impl SimPanTilt {
    pub fn new(step_deg: u16) -> Self {
        Self {
            step_deg,
            angle_deg: 0,
        }
    }

    pub fn angle_deg(&self) -> u16 {
        self.angle_deg
    }
}

impl PanTiltPort for SimPanTilt {
    fn step(&mut self) -> Result<(), HardwareError> {
        self.angle_deg = (self.angle_deg + self.step_deg) % 360;
        info!("PAN | {}°", self.angle_deg);
        Ok(())
    }
}

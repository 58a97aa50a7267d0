//! Capture session: what the control loop does while the scope is CAPTURE.
//!
//! A session owns the rig [`Timer`] and drives every periodic action off
//! its named intervals:
//!
//! ```text
//!   "altitude"  every alt_reading_interval      → read_altitude
//!   "photo"     every pic_interval (after delay) → capture_photo
//!   "pan_tilt"  every pan_interval              → step
//!   marks "video_start" / "video_end"           → start/stop recording
//! ```
//!
//! All intervals use catch-up scheduling, so a slow camera call never makes
//! the photo cadence drift.  Collaborator failures are logged and that
//! action is skipped for the tick.

use core::time::Duration;

use log::{error, info, warn};
use serde::Serialize;

use crate::app::events::RigEvent;
use crate::app::ports::{RigPorts, SettingsPort, TimePort};
use crate::config;
use crate::timer::Timer;

const INTERVAL_ALTITUDE: &str = "altitude";
const INTERVAL_PHOTO: &str = "photo";
const INTERVAL_PAN_TILT: &str = "pan_tilt";
const MARK_START: &str = "capture_start";
const MARK_VIDEO_START: &str = "video_start";
const MARK_VIDEO_END: &str = "video_end";

// ── Plan ──────────────────────────────────────────────────────

/// What the camera does during a session (`cam_take_photos`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaptureMode {
    #[serde(rename = "pic")]
    Photo,
    #[serde(rename = "vid")]
    Video,
    /// Altitude logging only.
    #[serde(rename = "none")]
    AltitudeOnly,
}

impl CaptureMode {
    pub fn from_setting(value: &str) -> Option<Self> {
        match value {
            "pic" => Some(Self::Photo),
            "vid" => Some(Self::Video),
            "none" => Some(Self::AltitudeOnly),
            _ => None,
        }
    }
}

/// Text burned into each photo (`pic_annotations`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    None,
    Altitude,
    Time,
    AltitudeTime,
}

impl Annotation {
    pub fn from_setting(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "alt" => Some(Self::Altitude),
            "time" => Some(Self::Time),
            "alttime" => Some(Self::AltitudeTime),
            _ => None,
        }
    }

    /// Render the annotation for one frame, `None` when disabled.
    pub fn render(self, altitude_ft: Option<f32>, timestamp: &str) -> Option<String> {
        let alt = || altitude_ft.map_or_else(|| "--".to_string(), |a| format!("{a:.1}"));
        match self {
            Self::None => None,
            Self::Altitude => Some(format!("Altitude: {}'", alt())),
            Self::Time => Some(timestamp.to_string()),
            Self::AltitudeTime => Some(format!("Altitude: {}'  |  {}", alt(), timestamp)),
        }
    }
}

/// Session parameters, read from settings when a capture starts.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturePlan {
    pub mode: CaptureMode,
    pub alt_interval: Duration,
    /// Wait after start before the camera does anything.
    pub recording_delay: Duration,
    pub pic_interval: Duration,
    pub annotation: Annotation,
    pub vid_length: Duration,
    /// Record again after `vid_interval` once a clip ends.
    pub vid_multiple: bool,
    pub vid_interval: Duration,
    pub pan_enabled: bool,
    pub pan_interval: Duration,
}

impl Default for CapturePlan {
    fn default() -> Self {
        Self::from_lookup(|key| config::default_setting(key).map(str::to_string))
    }
}

impl CapturePlan {
    /// Missing keys fall back to their factory default with a warning.
    pub fn from_settings(settings: &impl SettingsPort) -> Self {
        Self::from_lookup(|key| {
            Some(settings.get_or(key, config::default_setting(key).unwrap_or("")))
        })
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str| {
            lookup(key)
                .or_else(|| config::default_setting(key).map(str::to_string))
                .unwrap_or_default()
        };
        // Negative, non-finite and out-of-range values are all rejected here.
        let parse_secs = |raw: &str| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .and_then(|s| Duration::try_from_secs_f64(s).ok())
        };
        let secs = |key: &str| {
            let raw = text(key);
            parse_secs(&raw).unwrap_or_else(|| {
                let fallback = config::default_setting(key)
                    .and_then(parse_secs)
                    .unwrap_or(Duration::from_secs(1));
                warn!("Setting {} = '{}' is not a duration, using {:?}", key, raw, fallback);
                fallback
            })
        };
        let flag = |key: &str| {
            matches!(
                text(key).trim().to_ascii_lowercase().as_str(),
                "yes" | "true" | "on" | "1"
            )
        };

        let mode_raw = text("cam_take_photos");
        let mode = CaptureMode::from_setting(&mode_raw).unwrap_or_else(|| {
            warn!("Unknown capture mode '{}', logging altitude only", mode_raw);
            CaptureMode::AltitudeOnly
        });
        let annotation_raw = text("pic_annotations");
        let annotation = Annotation::from_setting(&annotation_raw).unwrap_or_else(|| {
            warn!("Unknown annotation '{}', disabling annotations", annotation_raw);
            Annotation::None
        });

        Self {
            mode,
            alt_interval: secs("alt_reading_interval"),
            recording_delay: secs("cam_recording_delay"),
            pic_interval: secs("pic_interval"),
            annotation,
            vid_length: secs("vid_length"),
            vid_multiple: flag("vid_multiple"),
            vid_interval: secs("vid_interval"),
            pan_enabled: flag("pan_enabled"),
            pan_interval: secs("pan_interval"),
        }
    }
}

// ── Session ───────────────────────────────────────────────────

/// Counters for the current (or last) session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CaptureStats {
    pub altitude_samples: u32,
    pub photos: u32,
    pub videos: u32,
    pub pan_steps: u32,
    pub last_altitude_ft: Option<f32>,
}

pub struct CaptureSession<T: TimePort> {
    timer: Timer<T>,
    plan: CapturePlan,
    stats: CaptureStats,
    photo_started: bool,
    recording: bool,
}

impl<T: TimePort> CaptureSession<T> {
    pub fn new(timer: Timer<T>) -> Self {
        Self {
            timer,
            plan: CapturePlan::default(),
            stats: CaptureStats::default(),
            photo_started: false,
            recording: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.timer.is_stopped()
    }

    pub fn is_paused(&self) -> bool {
        self.timer.is_paused()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn plan(&self) -> &CapturePlan {
        &self.plan
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    pub fn timer(&self) -> &Timer<T> {
        &self.timer
    }

    /// Begin a session.  Returns `false` if one is already running.
    pub fn start(&mut self, plan: CapturePlan, ports: &mut impl RigPorts) -> bool {
        if self.is_active() {
            warn!("Capture already running");
            return false;
        }
        info!("Starting capture: {:?}", plan);
        self.plan = plan;
        self.stats = CaptureStats::default();
        self.photo_started = false;
        self.recording = false;

        if let Err(e) = ports.calibrate() {
            error!("Altimeter calibration failed: {}", e);
        }

        self.timer.start();
        self.timer.mark(MARK_START);
        self.sample_altitude(ports);
        self.timer.set_named_interval(INTERVAL_ALTITUDE);
        if self.plan.pan_enabled {
            self.timer.set_named_interval(INTERVAL_PAN_TILT);
        }

        ports.print_message("Ready to Launch!");
        ports.emit(&RigEvent::CaptureStarted { mode: self.plan.mode });
        true
    }

    /// One control-loop step.  Does nothing unless the timer is running.
    pub fn tick(&mut self, ports: &mut impl RigPorts) {
        if !self.timer.is_running() {
            return;
        }

        if self.timer.interval_elapsed(self.plan.alt_interval, INTERVAL_ALTITUDE, true) {
            self.sample_altitude(ports);
        }

        let delay_passed = self
            .timer
            .since_mark(MARK_START)
            .is_some_and(|d| d >= self.plan.recording_delay);

        match self.plan.mode {
            CaptureMode::Photo if delay_passed => self.photo_tick(ports),
            CaptureMode::Video if delay_passed => self.video_tick(ports),
            _ => {}
        }

        if self.plan.pan_enabled
            && self.timer.interval_elapsed(self.plan.pan_interval, INTERVAL_PAN_TILT, true)
        {
            match ports.step() {
                Ok(()) => {
                    self.stats.pan_steps += 1;
                    ports.emit(&RigEvent::PanTiltStepped);
                }
                Err(e) => error!("Pan/tilt step failed: {}", e),
            }
        }
    }

    /// Pause or resume.  Returns the new paused state, `None` when no
    /// session is active.
    pub fn toggle_pause(&mut self, ports: &mut impl RigPorts) -> Option<bool> {
        let paused = if self.timer.is_running() {
            self.timer.pause();
            true
        } else if self.timer.is_paused() {
            self.timer.resume();
            false
        } else {
            warn!("No capture to pause");
            return None;
        };
        ports.print_message(if paused { "Paused" } else { "Running" });
        ports.emit(&RigEvent::CapturePaused { paused });
        Some(paused)
    }

    /// End the session, returning its elapsed time (excluding pauses).
    pub fn stop(&mut self, ports: &mut impl RigPorts) -> Option<Duration> {
        if !self.is_active() {
            warn!("No capture to stop");
            return None;
        }
        if self.recording {
            self.stop_video(ports);
        }
        let elapsed = self.timer.stop();
        info!("Capture stopped: {:?}, {:?}", elapsed, self.stats);
        ports.emit(&RigEvent::CaptureStopped {
            elapsed_secs: elapsed.map(|d| d.as_secs_f64()),
        });
        elapsed
    }

    // ── Actions ───────────────────────────────────────────────

    fn sample_altitude(&mut self, ports: &mut impl RigPorts) {
        match ports.read_altitude() {
            Ok(altitude_ft) => {
                self.stats.altitude_samples += 1;
                self.stats.last_altitude_ft = Some(altitude_ft);
                let elapsed_secs = self.timer.elapsed().unwrap_or_default().as_secs_f64();
                ports.emit(&RigEvent::AltitudeSampled {
                    elapsed_secs,
                    altitude_ft,
                });
            }
            Err(e) => error!("Altitude read failed: {}", e),
        }
    }

    fn photo_tick(&mut self, ports: &mut impl RigPorts) {
        if !self.photo_started {
            self.photo_started = true;
            self.timer.set_named_interval(INTERVAL_PHOTO);
            self.take_photo(ports);
        } else if self.timer.interval_elapsed(self.plan.pic_interval, INTERVAL_PHOTO, true) {
            self.take_photo(ports);
        }
    }

    fn take_photo(&mut self, ports: &mut impl RigPorts) {
        let timestamp = chrono::Local::now().format("%m-%d-%Y %H:%M:%S").to_string();
        let annotation = self
            .plan
            .annotation
            .render(self.stats.last_altitude_ft, &timestamp);
        match ports.capture_photo(annotation.as_deref()) {
            Ok(location) => {
                self.stats.photos += 1;
                ports.emit(&RigEvent::PhotoCaptured { location });
            }
            Err(e) => error!("Photo capture failed: {}", e),
        }
    }

    fn video_tick(&mut self, ports: &mut impl RigPorts) {
        if self.recording {
            if self
                .timer
                .since_mark(MARK_VIDEO_START)
                .is_some_and(|d| d >= self.plan.vid_length)
            {
                self.stop_video(ports);
            }
            return;
        }

        let due = if self.stats.videos == 0 {
            true
        } else {
            self.plan.vid_multiple
                && self
                    .timer
                    .since_mark(MARK_VIDEO_END)
                    .is_some_and(|d| d >= self.plan.vid_interval)
        };
        if !due {
            return;
        }

        match ports.start_video() {
            Ok(()) => {
                self.recording = true;
                self.timer.mark(MARK_VIDEO_START);
                ports.emit(&RigEvent::VideoStarted);
            }
            Err(e) => error!("Video start failed: {}", e),
        }
    }

    fn stop_video(&mut self, ports: &mut impl RigPorts) {
        if let Err(e) = ports.stop_video() {
            error!("Video stop failed: {}", e);
        }
        self.recording = false;
        self.stats.videos += 1;
        self.timer.mark(MARK_VIDEO_END);
        ports.emit(&RigEvent::VideoStopped);
    }
}

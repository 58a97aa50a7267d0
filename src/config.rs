//! System configuration parameters.
//!
//! Two layers:
//! - [`SystemConfig`]: process-level tunables (tick period, button timing,
//!   pins, file paths), loaded once at startup from `--config <path>`.
//! - [`DEFAULT_SETTINGS`]: factory values of the operator settings the menu
//!   edits and the capture loop reads.  These live in the settings file at
//!   runtime; this table is the fallback.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pins;

/// Factory operator settings, as `(key, value)` text pairs.
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    // --- Altitude ---
    ("alt_reading_interval", "5"),
    // --- Camera ---
    ("cam_take_photos", "pic"),
    ("cam_recording_delay", "10"),
    ("cam_rotation", "0"),
    // --- Photo ---
    ("pic_interval", "5"),
    ("pic_annotations", "none"),
    // --- Video ---
    ("vid_length", "60"),
    ("vid_multiple", "no"),
    ("vid_interval", "60"),
    // --- Pan / tilt ---
    ("pan_enabled", "no"),
    ("pan_interval", "10"),
    // --- Logging ---
    ("log_level", "INFO"),
];

/// Factory value for one operator setting.
pub fn default_setting(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Core process configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timing ---
    /// Control loop period (milliseconds).
    pub tick_period_ms: u64,
    /// Button sampling period (milliseconds).
    pub button_poll_ms: u64,
    /// A level must be stable this long to count (milliseconds).
    pub button_debounce_ms: u64,
    /// Hold this long before auto-repeat starts (milliseconds).
    pub button_hold_ms: u64,
    /// Auto-repeat period while held (milliseconds).
    pub button_repeat_ms: u64,

    // --- Buttons (BCM numbering) ---
    pub pin_back: u32,
    pub pin_select: u32,
    pub pin_next: u32,
    pub gpio_root: PathBuf,

    // --- Files ---
    /// Menu definition (JSON).  `None` uses the built-in menu.
    pub menu_path: Option<PathBuf>,
    pub settings_path: PathBuf,
    /// Factory settings file.  `None` uses [`DEFAULT_SETTINGS`].
    pub defaults_path: Option<PathBuf>,

    // --- Remote ---
    /// `host:port` for the remote command listener.  `None` disables it.
    pub remote_bind: Option<String>,

    // --- Power ---
    /// Log shutdown / reboot instead of running them.
    pub power_dry_run: bool,

    // --- Logging ---
    pub log_level: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_period_ms: 100, // 10 Hz
            button_poll_ms: 10,
            button_debounce_ms: 30,
            button_hold_ms: 600,
            button_repeat_ms: 200,

            // Buttons
            pin_back: pins::BUTTON_BACK_GPIO,
            pin_select: pins::BUTTON_SELECT_GPIO,
            pin_next: pins::BUTTON_NEXT_GPIO,
            gpio_root: PathBuf::from(pins::SYSFS_GPIO_ROOT),

            // Files
            menu_path: None,
            settings_path: PathBuf::from("settings.json"),
            defaults_path: None,

            // Remote
            remote_bind: Some("0.0.0.0:5000".to_string()),

            power_dry_run: false,

            log_level: "info".to_string(),
        }
    }
}

impl SystemConfig {
    /// Read a JSON config file.  A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::Invalid("tick_period_ms must be > 0"));
        }
        if self.button_poll_ms == 0 {
            return Err(ConfigError::Invalid("button_poll_ms must be > 0"));
        }
        if self.button_debounce_ms == 0 {
            return Err(ConfigError::Invalid("button_debounce_ms must be > 0"));
        }
        if self.button_repeat_ms == 0 {
            return Err(ConfigError::Invalid("button_repeat_ms must be > 0"));
        }
        if self.pin_back == self.pin_select
            || self.pin_back == self.pin_next
            || self.pin_select == self.pin_next
        {
            return Err(ConfigError::Invalid("button pins must be distinct"));
        }
        Ok(())
    }
}

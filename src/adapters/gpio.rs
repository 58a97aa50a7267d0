//! Linux sysfs GPIO input adapter.
//!
//! Implements `embedded_hal::digital::InputPin` over
//! `/sys/class/gpio/gpioN/value`, so the button driver runs unchanged on a
//! Raspberry Pi.  Pull-ups are not configurable through sysfs; the board
//! (or `/boot/config.txt`) must provide them.

use core::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin};
use log::{debug, info};

/// A sysfs read failed or returned something other than `0`/`1`.
#[derive(Debug)]
pub enum GpioError {
    Io(io::Error),
    BadLevel(String),
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "gpio I/O: {e}"),
            Self::BadLevel(raw) => write!(f, "unexpected gpio level '{raw}'"),
        }
    }
}

impl std::error::Error for GpioError {}

impl From<io::Error> for GpioError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// One exported GPIO line configured as input.
#[derive(Debug)]
pub struct SysfsPin {
    number: u32,
    value_path: PathBuf,
}

impl SysfsPin {
    /// Export `number` under `root` (if needed) and set it to input.
    pub fn open(root: &Path, number: u32) -> Result<Self, GpioError> {
        let dir = root.join(format!("gpio{number}"));
        if !dir.exists() {
            fs::write(root.join("export"), number.to_string())?;
            // udev needs a moment to fix permissions on the new node.
            thread::sleep(Duration::from_millis(100));
            debug!("Exported GPIO {}", number);
        }
        fs::write(dir.join("direction"), "in")?;
        info!("GPIO {} ready as input", number);
        Ok(Self {
            number,
            value_path: dir.join("value"),
        })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    fn read_level(&self) -> Result<bool, GpioError> {
        let raw = fs::read_to_string(&self.value_path)?;
        match raw.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(GpioError::BadLevel(other.to_string())),
        }
    }
}

impl ErrorType for SysfsPin {
    type Error = GpioError;
}

impl InputPin for SysfsPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.read_level()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.read_level().map(|high| !high)
    }
}

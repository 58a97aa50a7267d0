//! System power and status adapter.
//!
//! Shutdown and reboot shell out to the OS.  With `dry_run` set the
//! commands are only logged, which is what a desktop simulation wants.

use std::process::Command;

use log::{info, warn};

use crate::error::HardwareError;

const SHUTDOWN: &[&str] = &["sudo", "nohup", "shutdown", "-h", "now"];
const REBOOT: &[&str] = &["sudo", "reboot"];

/// Network / storage summary for the info screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub ip: String,
    pub disk: String,
    pub ssid: String,
}

impl SystemInfo {
    pub fn lines(&self) -> [String; 3] {
        [
            format!("IP: {}", self.ip),
            format!("Disk: {}", self.disk),
            format!("SSID: {}", self.ssid),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPower {
    dry_run: bool,
}

impl SystemPower {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    fn run(&self, argv: &[&str]) -> Result<(), HardwareError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(HardwareError::Failed("empty command".into()));
        };
        if self.dry_run {
            info!("[dry run] {}", argv.join(" "));
            return Ok(());
        }
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| HardwareError::Failed(format!("{program}: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(HardwareError::Failed(format!("{} exited with {}", argv.join(" "), status)))
        }
    }

    pub fn shutdown(&self) -> Result<(), HardwareError> {
        warn!("Shutting down");
        self.run(SHUTDOWN)
    }

    pub fn reboot(&self) -> Result<(), HardwareError> {
        warn!("Rebooting");
        self.run(REBOOT)
    }

    /// Gather what the info screen shows.  Fields that cannot be read
    /// come back as `"n/a"`.
    pub fn system_info(&self) -> SystemInfo {
        SystemInfo {
            ip: capture(&["hostname", "-I"])
                .and_then(|out| out.split_whitespace().next().map(str::to_string))
                .unwrap_or_else(na),
            disk: capture(&["df", "-h", "/"])
                .and_then(|out| parse_df(&out))
                .unwrap_or_else(na),
            ssid: capture(&["iwgetid", "-r"])
                .map(|out| out.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(na),
        }
    }
}

fn na() -> String {
    "n/a".to_string()
}

fn capture(argv: &[&str]) -> Option<String> {
    let (program, args) = argv.split_first()?;
    let out = Command::new(program).args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).into_owned())
}

/// `used/size` from `df -h` output.
fn parse_df(out: &str) -> Option<String> {
    let row = out.lines().nth(1)?;
    let cols: Vec<&str> = row.split_whitespace().collect();
    Some(format!("{}/{}", cols.get(2)?, cols.get(1)?))
}

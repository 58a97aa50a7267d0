//! GPIO pin assignments for the PiKite control board.
//!
//! Default BCM numbers for the three front-panel buttons.  The
//! [`SystemConfig`](crate::config::SystemConfig) defaults reference these;
//! a config file may override them for a different wiring.

// ---------------------------------------------------------------------------
// Front-panel buttons (active LOW, internal pull-up)
// ---------------------------------------------------------------------------

/// BACK button.
pub const BUTTON_BACK_GPIO: u32 = 17;
/// SELECT (action) button.
pub const BUTTON_SELECT_GPIO: u32 = 23;
/// NEXT button.
pub const BUTTON_NEXT_GPIO: u32 = 24;

// ---------------------------------------------------------------------------
// Linux GPIO sysfs
// ---------------------------------------------------------------------------

/// Root of the sysfs GPIO interface.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

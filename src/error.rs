//! Unified error types for the PiKite controller.
//!
//! Only construction-time problems are allowed to stop the process (an
//! empty menu root).  Everything that can go wrong while the control loop
//! runs is reported through these types and then logged by the caller, so
//! the loop keeps turning.

use core::fmt;

// ---------------------------------------------------------------------------
// Menu errors
// ---------------------------------------------------------------------------

/// Failures while turning a menu definition into a navigable tree.
#[derive(Debug)]
pub enum MenuError {
    /// The root element has no `menu_item` children to land on.
    EmptyRoot,
    /// The definition could not be read or parsed.
    Definition(DefinitionError),
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRoot => write!(f, "root menu must not be empty"),
            Self::Definition(e) => write!(f, "menu definition: {e}"),
        }
    }
}

impl std::error::Error for MenuError {}

impl From<DefinitionError> for MenuError {
    fn from(e: DefinitionError) -> Self {
        Self::Definition(e)
    }
}

// ---------------------------------------------------------------------------
// Definition errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum DefinitionError {
    /// The definition file could not be read.
    Io(std::io::Error),
    /// The definition is not valid JSON or has the wrong shape.
    Parse(serde_json::Error),
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "read failed: {e}"),
            Self::Parse(e) => write!(f, "parse failed: {e}"),
        }
    }
}

impl std::error::Error for DefinitionError {}

impl From<std::io::Error> for DefinitionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for DefinitionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Settings errors
// ---------------------------------------------------------------------------

/// Errors from [`SettingsPort`](crate::app::ports::SettingsPort) operations.
#[derive(Debug)]
pub enum SettingsError {
    /// The key's prefix does not map to any settings section.
    UnknownSection(String),
    /// The settings file could not be read or written.
    Io(std::io::Error),
    /// The settings file is not valid JSON.
    Corrupted(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSection(key) => {
                write!(f, "key '{key}' does not correspond to a known section")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Corrupted(e) => write!(f, "settings corrupted: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Corrupted(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value is out of range or inconsistent with another.
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Collaborator errors
// ---------------------------------------------------------------------------

/// A hardware collaborator (camera, altimeter, servo, power) failed.
///
/// The control loop logs these and skips the affected action for the
/// current tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareError {
    /// The device did not respond or is not attached.
    Unavailable(&'static str),
    /// The device reported a failure.
    Failed(String),
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(dev) => write!(f, "{dev} unavailable"),
            Self::Failed(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for HardwareError {}

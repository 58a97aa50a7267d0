//! Scoped command dispatch.
//!
//! Physical buttons, remote clients and internal triggers all feed the same
//! [`InputHandler`].  Which callbacks answer a command depends only on the
//! active scope, so adapters never need to know which screen is showing.
//!
//! ```text
//!   (scope, command) ──▶ [cb₁, cb₂, …]     dispatch consults
//!   ("MENU",  Next)  ──▶ [menu_next]        listeners[active_scope]
//!   ("CAPTURE", Back) ─▶ [stop_capture]     and nothing else
//! ```
//!
//! Dispatch is synchronous and runs on the control-loop thread.  Producers
//! on other threads go through [`InputQueue`](crate::events::InputQueue).

pub mod button_map;

use core::fmt;
use core::str::FromStr;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use button_map::{ButtonId, ButtonMap};

// ── Well-known scopes ─────────────────────────────────────────

/// Initial scope before the menu is shown.
pub const SCOPE_DEFAULT: &str = "default";
pub const SCOPE_MENU: &str = "MENU";
pub const SCOPE_CAPTURE: &str = "CAPTURE";
/// System info screen; any navigation returns to the menu.
pub const SCOPE_INFO: &str = "INFO";

// ── Vocabulary ────────────────────────────────────────────────

/// Operator commands understood by the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputCommand {
    Next,
    Previous,
    /// Legacy remote clients send `"action"`.
    #[serde(alias = "action")]
    Select,
    Back,
    StartCapture,
    #[serde(alias = "stopPiKite")]
    StopCapture,
    PauseResume,
    Shutdown,
    Reboot,
}

impl InputCommand {
    pub const ALL: [Self; 9] = [
        Self::Next,
        Self::Previous,
        Self::Select,
        Self::Back,
        Self::StartCapture,
        Self::StopCapture,
        Self::PauseResume,
        Self::Shutdown,
        Self::Reboot,
    ];

    /// Cursor movement only.  Safe to auto-repeat.
    pub fn is_navigation(self) -> bool {
        matches!(self, Self::Next | Self::Previous)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Select => "select",
            Self::Back => "back",
            Self::StartCapture => "start_capture",
            Self::StopCapture => "stop_capture",
            Self::PauseResume => "pause_resume",
            Self::Shutdown => "shutdown",
            Self::Reboot => "reboot",
        }
    }
}

impl fmt::Display for InputCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a command name outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command '{}'", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

impl FromStr for InputCommand {
    type Err = UnknownCommand;

    /// Case-insensitive; accepts `"NEXT"` as well as `"next"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

/// Where a command came from.  Used for logging only; dispatch never
/// depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Gpio,
    Network,
    System,
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gpio => "GPIO",
            Self::Network => "NETWORK",
            Self::System => "SYSTEM",
        })
    }
}

// ── Handler ───────────────────────────────────────────────────

/// A registered reaction to a command.  `C` is the state the callback is
/// allowed to touch (the rig, in production).
pub type Callback<C> = Rc<dyn Fn(&mut C, InputSource, &Value) -> anyhow::Result<()>>;

/// Outcome of one [`InputHandler::handle`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Callbacks that were called.
    pub invoked: usize,
    /// Callbacks that returned an error or panicked.
    pub failed: usize,
}

/// Maps `(scope, command)` to an ordered list of callbacks.
pub struct InputHandler<C> {
    listeners: HashMap<String, HashMap<InputCommand, Vec<Callback<C>>>>,
    active_scope: String,
}

impl<C> Default for InputHandler<C> {
    fn default() -> Self {
        Self::new(SCOPE_DEFAULT)
    }
}

impl<C> InputHandler<C> {
    pub fn new(default_scope: &str) -> Self {
        Self {
            listeners: HashMap::new(),
            active_scope: default_scope.to_string(),
        }
    }

    pub fn active_scope(&self) -> &str {
        &self.active_scope
    }

    /// Switch the active scope.  Returns `false` if it was already active.
    /// Bindings of every scope are kept.
    pub fn set_scope(&mut self, scope: &str) -> bool {
        if self.active_scope == scope {
            return false;
        }
        info!("Input scope: {} -> {}", self.active_scope, scope);
        self.active_scope = scope.to_string();
        true
    }

    /// Append `callback` for `(scope, command)`.  Registering the same
    /// handle twice is a no-op; returns whether it was added.
    pub fn register(&mut self, scope: &str, command: InputCommand, callback: Callback<C>) -> bool {
        let list = self
            .listeners
            .entry(scope.to_string())
            .or_default()
            .entry(command)
            .or_default();

        if list.iter().any(|cb| Rc::ptr_eq(cb, &callback)) {
            debug!("Callback already registered for {}/{}", scope, command);
            return false;
        }
        list.push(callback);
        true
    }

    /// Drop every binding of `scope`.  Returns how many were removed.
    pub fn clear_scope(&mut self, scope: &str) -> usize {
        let removed = self
            .listeners
            .remove(scope)
            .map_or(0, |cmds| cmds.values().map(Vec::len).sum());
        info!("Cleared {} binding(s) from scope {}", removed, scope);
        removed
    }

    /// Number of callbacks bound to `(scope, command)`.
    pub fn bindings(&self, scope: &str, command: InputCommand) -> usize {
        self.listeners
            .get(scope)
            .and_then(|cmds| cmds.get(&command))
            .map_or(0, Vec::len)
    }

    /// Invoke every callback bound to `(active_scope, command)` in
    /// registration order.  A failing or panicking callback is logged and
    /// the rest still run.  No binding is a silent no-op.
    pub fn handle(
        &self,
        ctx: &mut C,
        command: InputCommand,
        source: InputSource,
        context: &Value,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        let Some(callbacks) = self
            .listeners
            .get(&self.active_scope)
            .and_then(|cmds| cmds.get(&command))
        else {
            debug!(
                "No callback for {} in scope {} (source {})",
                command, self.active_scope, source
            );
            return report;
        };

        debug!(
            "Dispatching {} from {} to {} callback(s) in scope {}",
            command,
            source,
            callbacks.len(),
            self.active_scope
        );

        for cb in callbacks {
            report.invoked += 1;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| cb(ctx, source, context)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    report.failed += 1;
                    error!(
                        "Callback for {} in scope {} failed: {:#}",
                        command, self.active_scope, e
                    );
                }
                Err(_) => {
                    report.failed += 1;
                    error!("Callback for {} in scope {} panicked", command, self.active_scope);
                }
            }
        }
        report
    }
}

/// Wrap a closure as a [`Callback`].
pub fn callback<C, F>(f: F) -> Callback<C>
where
    F: Fn(&mut C, InputSource, &Value) -> anyhow::Result<()> + 'static,
{
    Rc::new(f)
}

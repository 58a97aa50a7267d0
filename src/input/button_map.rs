//! Per-scope translation of the three physical buttons into commands.
//!
//! The rig has BACK, SELECT and NEXT buttons.  What they mean depends on
//! the screen: in the menu they navigate, during capture SELECT stops the
//! session and NEXT pauses it.  Resolution happens on the loop thread
//! against the active scope, so the GPIO side only reports *which* button.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{InputCommand, SCOPE_CAPTURE};

/// Physical buttons on the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonId {
    Back,
    Select,
    Next,
}

impl ButtonId {
    pub const ALL: [Self; 3] = [Self::Back, Self::Select, Self::Next];

    /// Command used when no scope overrides the button.
    pub fn default_command(self) -> InputCommand {
        match self {
            Self::Back => InputCommand::Back,
            Self::Select => InputCommand::Select,
            Self::Next => InputCommand::Next,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ButtonMap {
    overrides: HashMap<String, HashMap<ButtonId, InputCommand>>,
}

impl ButtonMap {
    /// Map with no overrides: every button sends its own command.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The rig's standard layout.
    pub fn standard() -> Self {
        let mut map = Self::empty();
        map.set_command(SCOPE_CAPTURE, ButtonId::Select, InputCommand::StopCapture);
        map.set_command(SCOPE_CAPTURE, ButtonId::Next, InputCommand::PauseResume);
        map
    }

    pub fn set_command(&mut self, scope: &str, button: ButtonId, command: InputCommand) {
        self.overrides
            .entry(scope.to_string())
            .or_default()
            .insert(button, command);
    }

    pub fn resolve(&self, scope: &str, button: ButtonId) -> InputCommand {
        self.overrides
            .get(scope)
            .and_then(|m| m.get(&button))
            .copied()
            .unwrap_or_else(|| button.default_command())
    }
}

//! Thread-safe event queues between input producers and the control loop.
//!
//! Button edges are sampled on the button thread and remote commands
//! arrive on the remote I/O thread.  Neither may touch the input handler
//! or the active scope directly; they push into an [`InputQueue`] and the
//! control loop drains it on its own turn, so every scope-dependent
//! decision has a single writer.
//!
//! ```text
//! ┌──────────────┐  InputEvent   ┌──────────────┐  RigEvent   ┌──────────────┐
//! │ Button thread│──────┐        │              │────────────▶│ Remote I/O   │
//! │              │      ├──────▶│ Control loop │ StatusQueue │ thread       │
//! │ Remote I/O   │──────┘        │              │             │              │
//! └──────────────┘  InputQueue   └──────────────┘             └──────────────┘
//! ```
//!
//! Both queues are bounded `embassy-sync` channels.  A full queue drops the
//! new event with a warning; nothing ever blocks the producer.

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;
use serde_json::Value;

use crate::app::events::RigEvent;
use crate::input::{ButtonId, InputCommand, InputSource};

/// Depth of the inbound input queue.
pub const INPUT_QUEUE_DEPTH: usize = 32;

/// Depth of the outbound status queue.
pub const STATUS_QUEUE_DEPTH: usize = 32;

/// Something an operator did.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A physical button was pressed, or auto-repeated while held
    /// (`repeat`).  Mapped to a command against the active scope by the
    /// control loop; repeats only ever navigate.
    Button { button: ButtonId, repeat: bool },
    /// A fully-formed command, e.g. from a remote client.
    Command {
        command: InputCommand,
        source: InputSource,
        context: Value,
    },
}

impl InputEvent {
    pub fn press(button: ButtonId) -> Self {
        Self::Button {
            button,
            repeat: false,
        }
    }

    pub fn repeat(button: ButtonId) -> Self {
        Self::Button {
            button,
            repeat: true,
        }
    }

    pub fn command(command: InputCommand, source: InputSource) -> Self {
        Self::Command {
            command,
            source,
            context: Value::Null,
        }
    }
}

// ── Inbound ───────────────────────────────────────────────────

/// Producers → control loop.  Cheap to clone; clones share the channel.
#[derive(Clone)]
pub struct InputQueue {
    channel: Arc<Channel<CriticalSectionRawMutex, InputEvent, INPUT_QUEUE_DEPTH>>,
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            channel: Arc::new(Channel::new()),
        }
    }

    /// Enqueue an event.  Returns `false` (event dropped) when full.
    pub fn push(&self, event: InputEvent) -> bool {
        match self.channel.try_send(event) {
            Ok(()) => true,
            Err(_) => {
                warn!("Input queue full, dropping event");
                false
            }
        }
    }

    pub fn pop(&self) -> Option<InputEvent> {
        self.channel.try_receive().ok()
    }

    /// Hand every pending event to `handler`, oldest first.
    pub fn drain(&self, mut handler: impl FnMut(InputEvent)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

// ── Outbound ──────────────────────────────────────────────────

/// Control loop → remote clients.
#[derive(Clone)]
pub struct StatusQueue {
    channel: Arc<Channel<CriticalSectionRawMutex, RigEvent, STATUS_QUEUE_DEPTH>>,
}

impl Default for StatusQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusQueue {
    pub fn new() -> Self {
        Self {
            channel: Arc::new(Channel::new()),
        }
    }

    /// Enqueue an event.  Returns `false` (event dropped) when full.
    pub fn push(&self, event: RigEvent) -> bool {
        self.channel.try_send(event).is_ok()
    }

    pub fn pop(&self) -> Option<RigEvent> {
        self.channel.try_receive().ok()
    }

    /// Wait for the next event (async consumers).
    pub async fn next(&self) -> RigEvent {
        self.channel.receive().await
    }
}

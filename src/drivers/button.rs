//! Polled, debounced button driver with hold-to-repeat.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up.  The pin is sampled from the
//! button thread every few milliseconds; [`ButtonDriver::tick`] runs the
//! debounce + repeat state machine on each sample.
//!
//! ## Events
//!
//! | Event     | Condition                                        |
//! |-----------|--------------------------------------------------|
//! | `Pressed` | Level LOW and stable for the debounce window     |
//! | `Held`    | Still pressed after `hold_ms`, then every `repeat_ms` |
//!
//! Holding NEXT therefore scrolls through the menu.  `Held` reaches the
//! queue as a repeat, and the control loop only lets repeats navigate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use embedded_hal::digital::InputPin;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::events::{InputEvent, InputQueue};
use crate::input::ButtonId;

/// Classified button events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
    Held,
}

/// Debounce and repeat timings, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonTiming {
    pub debounce_ms: u64,
    pub hold_ms: u64,
    pub repeat_ms: u64,
}

impl ButtonTiming {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            debounce_ms: config.button_debounce_ms,
            hold_ms: config.button_hold_ms,
            repeat_ms: config.button_repeat_ms.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonState {
    Idle,
    DebouncePress { since_ms: u64 },
    Pressed { next_repeat_ms: u64 },
    DebounceRelease { since_ms: u64, next_repeat_ms: u64 },
}

pub struct ButtonDriver<P: InputPin> {
    pin: P,
    timing: ButtonTiming,
    state: ButtonState,
}

impl<P: InputPin> ButtonDriver<P> {
    pub fn new(pin: P, timing: ButtonTiming) -> Self {
        Self {
            pin,
            timing,
            state: ButtonState::Idle,
        }
    }

    /// Active-low read.  A failing pin reads as released.
    fn is_pressed(&mut self) -> bool {
        match self.pin.is_low() {
            Ok(low) => low,
            Err(e) => {
                warn!("Button read failed: {:?}", e);
                false
            }
        }
    }

    /// Sample the pin.  `now_ms` is monotonic time in milliseconds.
    pub fn tick(&mut self, now_ms: u64) -> Option<ButtonEvent> {
        let pressed = self.is_pressed();
        let t = self.timing;

        match self.state {
            ButtonState::Idle => {
                if pressed {
                    self.state = ButtonState::DebouncePress { since_ms: now_ms };
                }
                None
            }

            ButtonState::DebouncePress { since_ms } => {
                if !pressed {
                    self.state = ButtonState::Idle;
                    None
                } else if now_ms.saturating_sub(since_ms) >= t.debounce_ms {
                    self.state = ButtonState::Pressed {
                        next_repeat_ms: now_ms + t.hold_ms,
                    };
                    Some(ButtonEvent::Pressed)
                } else {
                    None
                }
            }

            ButtonState::Pressed { next_repeat_ms } => {
                if !pressed {
                    self.state = ButtonState::DebounceRelease {
                        since_ms: now_ms,
                        next_repeat_ms,
                    };
                    None
                } else if now_ms >= next_repeat_ms {
                    self.state = ButtonState::Pressed {
                        next_repeat_ms: next_repeat_ms + t.repeat_ms,
                    };
                    Some(ButtonEvent::Held)
                } else {
                    None
                }
            }

            ButtonState::DebounceRelease {
                since_ms,
                next_repeat_ms,
            } => {
                if pressed {
                    // Contact bounce, still held.
                    self.state = ButtonState::Pressed { next_repeat_ms };
                } else if now_ms.saturating_sub(since_ms) >= t.debounce_ms {
                    self.state = ButtonState::Idle;
                }
                None
            }
        }
    }
}

// ── Panel thread ──────────────────────────────────────────────

/// All front-panel buttons, sampled on one thread.
pub struct ButtonPanel<P: InputPin> {
    buttons: Vec<(ButtonId, ButtonDriver<P>)>,
    poll: Duration,
}

impl<P: InputPin> ButtonPanel<P> {
    pub fn new(poll: Duration) -> Self {
        Self {
            buttons: Vec::new(),
            poll,
        }
    }

    pub fn add(&mut self, id: ButtonId, driver: ButtonDriver<P>) {
        self.buttons.push((id, driver));
    }

    /// Sample every button once, pushing events into `queue`.
    pub fn poll_once(&mut self, now_ms: u64, queue: &InputQueue) {
        for (id, driver) in &mut self.buttons {
            if let Some(event) = driver.tick(now_ms) {
                debug!("Button {:?}: {:?}", id, event);
                queue.push(match event {
                    ButtonEvent::Pressed => InputEvent::press(*id),
                    ButtonEvent::Held => InputEvent::repeat(*id),
                });
            }
        }
    }
}

impl<P: InputPin + Send + 'static> ButtonPanel<P> {
    /// Run on a dedicated thread until `shutdown` is set.
    pub fn spawn(
        mut self,
        queue: InputQueue,
        shutdown: Arc<AtomicBool>,
    ) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new().name("buttons".into()).spawn(move || {
            info!("Button thread started ({} buttons)", self.buttons.len());
            let origin = Instant::now();
            while !shutdown.load(Ordering::Relaxed) {
                let now_ms = origin.elapsed().as_millis() as u64;
                self.poll_once(now_ms, &queue);
                thread::sleep(self.poll);
            }
            info!("Button thread stopped");
        })
    }
}

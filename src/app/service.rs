//! Control loop: the hexagonal core.
//!
//! [`Controller`] owns the input handler, the button map and the [`Rig`]
//! (menu, capture session, ports).  Each tick it drains the input queue,
//! dispatches every event against the active scope, applies any scope
//! change the callbacks asked for, and then, when capturing, runs one
//! capture step.
//!
//! ```text
//!  InputQueue ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │         Controller           │
//!                 │ ButtonMap · InputHandler<Rig>│
//!  Display ◀──────│ Rig: Menu · CaptureSession   │──▶ Camera / Altimeter
//!                 └──────────────────────────────┘
//! ```
//!
//! Callbacks never switch scope themselves; they call
//! [`Rig::request_scope`] and the controller applies it right after the
//! dispatch returns, still on the loop thread.

use core::time::Duration;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::Context;
use log::{debug, info, warn};
use serde_json::Value;

use crate::adapters::time::MonotonicTime;
use crate::config::SystemConfig;
use crate::events::{InputEvent, InputQueue};
use crate::input::{
    callback, ButtonMap, DispatchReport, InputCommand, InputHandler, InputSource, SCOPE_CAPTURE,
    SCOPE_DEFAULT, SCOPE_INFO, SCOPE_MENU,
};
use crate::logging;
use crate::menu::{ActionOutcome, Menu};
use crate::timer::Timer;

use super::capture::{CapturePlan, CaptureSession};
use super::events::RigEvent;
use super::ports::{RigPorts, TimePort};

// ───────────────────────────────────────────────────────────────
// Rig
// ───────────────────────────────────────────────────────────────

/// Everything input callbacks may act on.
pub struct Rig<P: RigPorts, T: TimePort = MonotonicTime> {
    menu: Menu,
    capture: CaptureSession<T>,
    ports: P,
    requested_scope: Option<String>,
    applied_log_level: Option<String>,
}

impl<P: RigPorts, T: TimePort> Rig<P, T> {
    pub fn new(menu: Menu, ports: P, timer: Timer<T>) -> Self {
        Self {
            menu,
            capture: CaptureSession::new(timer),
            ports,
            requested_scope: None,
            applied_log_level: None,
        }
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn capture(&self) -> &CaptureSession<T> {
        &self.capture
    }

    pub fn ports(&self) -> &P {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut P {
        &mut self.ports
    }

    /// Ask the controller to switch scope once the current dispatch ends.
    /// The last request wins.
    pub fn request_scope(&mut self, scope: &str) {
        self.requested_scope = Some(scope.to_string());
    }

    fn take_requested_scope(&mut self) -> Option<String> {
        self.requested_scope.take()
    }

    // ── Menu actions ──────────────────────────────────────────

    pub fn menu_next(&mut self) {
        self.menu.increment_element(&mut self.ports);
    }

    pub fn menu_previous(&mut self) {
        self.menu.decrement_element(&mut self.ports);
    }

    pub fn menu_back(&mut self) {
        if !self.menu.ascend(&mut self.ports) {
            debug!("Already at the top level");
        }
    }

    pub fn menu_select(&mut self) -> ActionOutcome {
        let outcome = self.menu.do_action(&mut self.ports);
        match outcome {
            ActionOutcome::CaptureRequested => self.begin_capture(),
            ActionOutcome::InfoShown => self.request_scope(SCOPE_INFO),
            ActionOutcome::Moved => self.apply_log_level(),
            ActionOutcome::Delegated | ActionOutcome::Ignored => {}
        }
        outcome
    }

    /// Re-apply the `log_level` setting if it changed.
    fn apply_log_level(&mut self) {
        let Some(level) = self.ports.get("log_level") else {
            return;
        };
        if self.applied_log_level.as_deref() != Some(level.as_str()) {
            logging::set_level(&level);
            self.applied_log_level = Some(level);
        }
    }

    pub fn leave_info(&mut self) {
        self.menu.start(&mut self.ports);
        self.request_scope(SCOPE_MENU);
    }

    // ── Capture actions ───────────────────────────────────────

    pub fn begin_capture(&mut self) {
        let plan = CapturePlan::from_settings(&self.ports);
        if self.capture.start(plan, &mut self.ports) {
            self.request_scope(SCOPE_CAPTURE);
        }
    }

    pub fn end_capture(&mut self) -> Option<Duration> {
        let elapsed = self.capture.stop(&mut self.ports);
        self.menu.restart(&mut self.ports);
        self.request_scope(SCOPE_MENU);
        elapsed
    }

    pub fn toggle_pause(&mut self) -> Option<bool> {
        self.capture.toggle_pause(&mut self.ports)
    }

    fn capture_tick(&mut self) {
        self.capture.tick(&mut self.ports);
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller<P: RigPorts, T: TimePort = MonotonicTime> {
    handler: InputHandler<Rig<P, T>>,
    buttons: ButtonMap,
    rig: Rig<P, T>,
    queue: InputQueue,
    tick_period: Duration,
}

impl<P: RigPorts + 'static, T: TimePort + 'static> Controller<P, T> {
    /// Construct the controller.  Does **not** register bindings or show
    /// the menu; call [`install_bindings`](Self::install_bindings) and
    /// [`start`](Self::start) next.
    pub fn new(
        menu: Menu,
        ports: P,
        timer: Timer<T>,
        queue: InputQueue,
        config: &SystemConfig,
    ) -> Self {
        Self {
            handler: InputHandler::new(SCOPE_DEFAULT),
            buttons: ButtonMap::standard(),
            rig: Rig::new(menu, ports, timer),
            queue,
            tick_period: Duration::from_millis(config.tick_period_ms),
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn rig(&self) -> &Rig<P, T> {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut Rig<P, T> {
        &mut self.rig
    }

    pub fn handler(&self) -> &InputHandler<Rig<P, T>> {
        &self.handler
    }

    /// For registering extra bindings.
    pub fn handler_mut(&mut self) -> &mut InputHandler<Rig<P, T>> {
        &mut self.handler
    }

    pub fn buttons_mut(&mut self) -> &mut ButtonMap {
        &mut self.buttons
    }

    pub fn active_scope(&self) -> &str {
        self.handler.active_scope()
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Register the stock MENU / CAPTURE / INFO bindings.
    pub fn install_bindings(&mut self) {
        use InputCommand::{
            Back, Next, PauseResume, Previous, Reboot, Select, Shutdown, StartCapture, StopCapture,
        };
        let h = &mut self.handler;

        // ── MENU ──
        h.register(SCOPE_MENU, Next, callback(|rig: &mut Rig<P, T>, _, _| {
            rig.menu_next();
            Ok(())
        }));
        h.register(SCOPE_MENU, Previous, callback(|rig: &mut Rig<P, T>, _, _| {
            rig.menu_previous();
            Ok(())
        }));
        h.register(SCOPE_MENU, Select, callback(|rig: &mut Rig<P, T>, _, _| {
            rig.menu_select();
            Ok(())
        }));
        h.register(SCOPE_MENU, Back, callback(|rig: &mut Rig<P, T>, _, _| {
            rig.menu_back();
            Ok(())
        }));
        h.register(SCOPE_MENU, StartCapture, callback(|rig: &mut Rig<P, T>, _, _| {
            rig.begin_capture();
            Ok(())
        }));
        h.register(SCOPE_MENU, Shutdown, callback(|rig: &mut Rig<P, T>, src, _| {
            info!("Shutdown requested via {}", src);
            rig.ports_mut().shutdown().context("shutdown")
        }));
        h.register(SCOPE_MENU, Reboot, callback(|rig: &mut Rig<P, T>, src, _| {
            info!("Reboot requested via {}", src);
            rig.ports_mut().reboot().context("reboot")
        }));

        // ── CAPTURE ──
        let stop = callback(|rig: &mut Rig<P, T>, _, _| {
            rig.end_capture();
            Ok(())
        });
        h.register(SCOPE_CAPTURE, StopCapture, stop.clone());
        h.register(SCOPE_CAPTURE, Back, stop);
        h.register(SCOPE_CAPTURE, PauseResume, callback(|rig: &mut Rig<P, T>, _, _| {
            rig.toggle_pause();
            Ok(())
        }));

        // ── INFO ──
        let leave = callback(|rig: &mut Rig<P, T>, _, _| {
            rig.leave_info();
            Ok(())
        });
        for cmd in [Next, Previous, Select, Back] {
            h.register(SCOPE_INFO, cmd, leave.clone());
        }
    }

    /// Show the menu and enter the MENU scope.
    pub fn start(&mut self) {
        self.rig.menu.start(&mut self.rig.ports);
        self.set_scope(SCOPE_MENU);
        info!("Controller started");
    }

    /// Switch scope, emitting [`RigEvent::ScopeChanged`] when it changes.
    pub fn set_scope(&mut self, scope: &str) -> bool {
        let from = self.handler.active_scope().to_string();
        if !self.handler.set_scope(scope) {
            return false;
        }
        self.rig.ports.emit(&RigEvent::ScopeChanged {
            from,
            to: scope.to_string(),
        });
        true
    }

    // ── Dispatch ──────────────────────────────────────────────

    /// Dispatch one command against the active scope, then apply any
    /// requested scope change.
    pub fn handle(
        &mut self,
        command: InputCommand,
        source: InputSource,
        context: &Value,
    ) -> DispatchReport {
        let report = self.handler.handle(&mut self.rig, command, source, context);
        if let Some(scope) = self.rig.take_requested_scope() {
            self.set_scope(&scope);
        }
        report
    }

    /// Resolve and dispatch one queued event.
    pub fn dispatch(&mut self, event: InputEvent) -> DispatchReport {
        match event {
            InputEvent::Button { button, repeat } => {
                let scope = self.handler.active_scope();
                let command = self.buttons.resolve(scope, button);
                if repeat && !command.is_navigation() {
                    debug!("Ignoring held {:?} ({}) in {}", button, command, scope);
                    return DispatchReport::default();
                }
                debug!("Button {:?} -> {} in {}", button, command, scope);
                self.handle(command, InputSource::Gpio, &Value::Null)
            }
            InputEvent::Command {
                command,
                source,
                context,
            } => self.handle(command, source, &context),
        }
    }

    /// One loop iteration.
    pub fn tick(&mut self) {
        let queue = self.queue.clone();
        queue.drain(|event| {
            self.dispatch(event);
        });
        if self.handler.active_scope() == SCOPE_CAPTURE {
            self.rig.capture_tick();
        }
    }

    /// Tick at the configured period until `shutdown` is set.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!("Control loop running every {:?}", self.tick_period);
        while !shutdown.load(Ordering::Relaxed) {
            let started = Instant::now();
            self.tick();
            let spent = started.elapsed();
            if spent > self.tick_period {
                warn!("Tick overran: {:?} > {:?}", spent, self.tick_period);
            }
            std::thread::sleep(self.tick_period.saturating_sub(spent));
        }
        if self.rig.capture.is_active() {
            self.rig.end_capture();
        }
        info!("Control loop stopped");
    }
}

//! Integration tests for the Controller → InputHandler → Menu / Capture
//! pipeline.
//!
//! Every test drives the controller only through its public input surface
//! (buttons, remote commands, ticks) and asserts on what reached the mock
//! rig.

use std::time::Duration;

use serde_json::Value;

use pikite::app::events::RigEvent;
use pikite::app::service::Controller;
use pikite::config::SystemConfig;
use pikite::drivers::button::{ButtonDriver, ButtonPanel, ButtonTiming};
use pikite::events::{InputEvent, InputQueue};
use pikite::input::{
    callback, ButtonId, InputCommand, InputSource, SCOPE_CAPTURE, SCOPE_DEFAULT, SCOPE_INFO,
    SCOPE_MENU,
};
use pikite::menu::{Menu, MenuNode};
use pikite::timer::Timer;

use crate::mock_hw::{FakeButton, HwCall, ManualClock, MockRig};

type TestController = Controller<MockRig, ManualClock>;

fn make_controller(rig: MockRig) -> (TestController, ManualClock, InputQueue) {
    let clock = ManualClock::new();
    let queue = InputQueue::new();
    let menu = Menu::from_definition(&MenuNode::builtin()).unwrap();
    let mut ctrl = Controller::new(
        menu,
        rig,
        Timer::with_clock(clock.clone()),
        queue.clone(),
        &SystemConfig::default(),
    );
    ctrl.install_bindings();
    ctrl.start();
    (ctrl, clock, queue)
}

fn press(ctrl: &mut TestController, button: ButtonId) {
    ctrl.dispatch(InputEvent::press(button));
}

/// Hold `button` down through a real [`ButtonPanel`] for `ms`, ticking the
/// controller every poll.  Returns each scope the controller passed through.
fn hold(
    ctrl: &mut TestController,
    queue: &InputQueue,
    button: ButtonId,
    ms: u64,
) -> Vec<String> {
    let config = SystemConfig::default();
    let pin = FakeButton::default();
    pin.set_pressed(true);
    let mut panel = ButtonPanel::new(Duration::from_millis(config.button_poll_ms));
    panel.add(button, ButtonDriver::new(pin, ButtonTiming::from_config(&config)));

    let mut scopes = vec![ctrl.active_scope().to_string()];
    for t in (0..=ms).step_by(config.button_poll_ms as usize) {
        panel.poll_once(t, queue);
        ctrl.tick();
        if scopes.last().map(String::as_str) != Some(ctrl.active_scope()) {
            scopes.push(ctrl.active_scope().to_string());
        }
    }
    scopes
}

fn remote(ctrl: &mut TestController, command: InputCommand) {
    ctrl.handle(command, InputSource::Network, &Value::Null);
}

fn hw(ctrl: &TestController) -> &MockRig {
    ctrl.rig().ports()
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_renders_first_item_and_enters_menu_scope() {
    let (ctrl, _, _) = make_controller(MockRig::new());

    assert_eq!(ctrl.active_scope(), SCOPE_MENU);
    assert_eq!(hw(&ctrl).last_message(), Some("Start PiKite"));
    assert_eq!(
        hw(&ctrl).scope_changes(),
        vec![(SCOPE_DEFAULT.to_string(), SCOPE_MENU.to_string())]
    );
}

// ── Menu navigation ───────────────────────────────────────────

#[test]
fn buttons_navigate_the_menu() {
    let (mut ctrl, _, _) = make_controller(MockRig::new());

    press(&mut ctrl, ButtonId::Next);
    assert_eq!(hw(&ctrl).last_message(), Some("Camera Settings"));

    press(&mut ctrl, ButtonId::Select);
    assert_eq!(hw(&ctrl).last_message(), Some("Capture Mode"));

    press(&mut ctrl, ButtonId::Back);
    assert_eq!(hw(&ctrl).last_message(), Some("Camera Settings"));

    // Already at the top level: nothing moves, nothing is rendered.
    let shown = hw(&ctrl).messages.len();
    press(&mut ctrl, ButtonId::Back);
    assert_eq!(hw(&ctrl).messages.len(), shown);
}

#[test]
fn previous_wraps_to_last_top_level_item() {
    let (mut ctrl, _, _) = make_controller(MockRig::new());
    remote(&mut ctrl, InputCommand::Previous);
    assert_eq!(hw(&ctrl).last_message(), Some("System"));
}

#[test]
fn choosing_an_option_stores_the_setting() {
    let (mut ctrl, _, _) = make_controller(MockRig::new());

    press(&mut ctrl, ButtonId::Next); // Camera Settings
    press(&mut ctrl, ButtonId::Select); // Capture Mode
    press(&mut ctrl, ButtonId::Select); // options, cursor on the stored value
    assert_eq!(hw(&ctrl).last_message(), Some("Capture Mode: Photos"));

    press(&mut ctrl, ButtonId::Next);
    assert_eq!(hw(&ctrl).last_message(), Some("Capture Mode: Video"));

    press(&mut ctrl, ButtonId::Select);
    assert_eq!(hw(&ctrl).settings["cam_take_photos"], "vid");
    assert_eq!(hw(&ctrl).last_message(), Some("Capture Mode"));
}

#[test]
fn rejected_setting_write_keeps_the_cursor() {
    let mut rig = MockRig::new();
    rig.read_only = true;
    let (mut ctrl, _, _) = make_controller(rig);

    press(&mut ctrl, ButtonId::Next);
    press(&mut ctrl, ButtonId::Select);
    press(&mut ctrl, ButtonId::Select);
    press(&mut ctrl, ButtonId::Next); // Video
    let shown = hw(&ctrl).messages.len();

    press(&mut ctrl, ButtonId::Select);
    assert_eq!(hw(&ctrl).settings["cam_take_photos"], "pic");
    assert_eq!(hw(&ctrl).messages.len(), shown);
    assert_eq!(ctrl.rig().menu().current().name, "Video");
}

// ── Capture flow ──────────────────────────────────────────────

#[test]
fn launch_starts_capture_and_switches_scope() {
    let (mut ctrl, _, _) = make_controller(MockRig::new());

    press(&mut ctrl, ButtonId::Select);

    assert_eq!(ctrl.active_scope(), SCOPE_CAPTURE);
    assert!(ctrl.rig().capture().is_active());
    assert_eq!(hw(&ctrl).count(&HwCall::Calibrate), 1);
    assert_eq!(hw(&ctrl).count(&HwCall::ReadAltitude), 1);
    assert_eq!(hw(&ctrl).last_message(), Some("Ready to Launch!"));
    assert!(hw(&ctrl)
        .events
        .iter()
        .any(|e| matches!(e, RigEvent::CaptureStarted { .. })));
}

#[test]
fn oversized_interval_setting_still_launches() {
    let (mut ctrl, _, _) = make_controller(MockRig::new().with_setting("pic_interval", "1e20"));

    let report = ctrl.handle(InputCommand::StartCapture, InputSource::Network, &Value::Null);

    assert_eq!(report.failed, 0);
    assert_eq!(ctrl.active_scope(), SCOPE_CAPTURE);
    assert!(ctrl.rig().capture().is_active());
}

#[test]
fn photo_session_follows_delay_and_intervals() {
    // Defaults: altitude every 5s, photos every 5s after a 10s delay.
    let (mut ctrl, clock, _) = make_controller(MockRig::new());
    press(&mut ctrl, ButtonId::Select);

    ctrl.tick();
    assert_eq!(hw(&ctrl).photos(), 0);

    clock.advance_secs(5);
    ctrl.tick();
    assert_eq!(hw(&ctrl).count(&HwCall::ReadAltitude), 2);
    assert_eq!(hw(&ctrl).photos(), 0, "still inside the start delay");

    clock.advance_secs(5);
    ctrl.tick();
    assert_eq!(hw(&ctrl).photos(), 1, "first photo right after the delay");

    clock.advance_secs(5);
    ctrl.tick();
    assert_eq!(hw(&ctrl).photos(), 2);
    assert_eq!(hw(&ctrl).count(&HwCall::ReadAltitude), 4);
    assert_eq!(ctrl.rig().capture().stats().photos, 2);
}

#[test]
fn select_in_capture_stops_and_returns_to_menu() {
    let (mut ctrl, clock, _) = make_controller(MockRig::new());
    press(&mut ctrl, ButtonId::Select);
    clock.advance_secs(12);

    press(&mut ctrl, ButtonId::Select);

    assert_eq!(ctrl.active_scope(), SCOPE_MENU);
    assert!(!ctrl.rig().capture().is_active());
    assert_eq!(hw(&ctrl).last_message(), Some("Start PiKite"));
    assert!(hw(&ctrl)
        .events
        .contains(&RigEvent::CaptureStopped { elapsed_secs: Some(12.0) }));
}

#[test]
fn pause_freezes_the_session_schedule() {
    let (mut ctrl, clock, _) = make_controller(MockRig::new());
    press(&mut ctrl, ButtonId::Select);

    press(&mut ctrl, ButtonId::Next); // PauseResume in CAPTURE
    assert!(ctrl.rig().capture().is_paused());
    assert_eq!(hw(&ctrl).last_message(), Some("Paused"));

    clock.advance_secs(30);
    ctrl.tick();
    assert_eq!(hw(&ctrl).count(&HwCall::ReadAltitude), 1);

    press(&mut ctrl, ButtonId::Next);
    assert!(!ctrl.rig().capture().is_paused());
    clock.advance_secs(5);
    ctrl.tick();
    assert_eq!(hw(&ctrl).count(&HwCall::ReadAltitude), 2);
    assert_eq!(ctrl.rig().capture().timer().elapsed(), Some(std::time::Duration::from_secs(5)));
}

#[test]
fn video_session_records_one_clip() {
    let rig = MockRig::new()
        .with_setting("cam_take_photos", "vid")
        .with_setting("cam_recording_delay", "0")
        .with_setting("vid_length", "30");
    let (mut ctrl, clock, _) = make_controller(rig);
    press(&mut ctrl, ButtonId::Select);

    ctrl.tick();
    assert_eq!(hw(&ctrl).count(&HwCall::StartVideo), 1);

    clock.advance_secs(30);
    ctrl.tick();
    assert_eq!(hw(&ctrl).count(&HwCall::StopVideo), 1);

    clock.advance_secs(120);
    ctrl.tick();
    assert_eq!(hw(&ctrl).count(&HwCall::StartVideo), 1, "vid_multiple is off");
}

#[test]
fn stopping_mid_clip_stops_the_camera() {
    let rig = MockRig::new()
        .with_setting("cam_take_photos", "vid")
        .with_setting("cam_recording_delay", "0");
    let (mut ctrl, _, _) = make_controller(rig);
    press(&mut ctrl, ButtonId::Select);
    ctrl.tick();
    assert!(ctrl.rig().capture().is_recording());

    remote(&mut ctrl, InputCommand::StopCapture);
    assert_eq!(hw(&ctrl).count(&HwCall::StopVideo), 1);
    assert_eq!(ctrl.active_scope(), SCOPE_MENU);
}

#[test]
fn pan_tilt_steps_when_enabled() {
    let rig = MockRig::new()
        .with_setting("cam_take_photos", "none")
        .with_setting("pan_enabled", "yes")
        .with_setting("pan_interval", "10");
    let (mut ctrl, clock, _) = make_controller(rig);
    press(&mut ctrl, ButtonId::Select);

    for _ in 0..3 {
        clock.advance_secs(10);
        ctrl.tick();
    }
    assert_eq!(hw(&ctrl).count(&HwCall::PanStep), 3);
    assert_eq!(hw(&ctrl).photos(), 0);
}

#[test]
fn menu_commands_are_inert_while_capturing() {
    let (mut ctrl, _, _) = make_controller(MockRig::new());
    press(&mut ctrl, ButtonId::Select);
    let shown = hw(&ctrl).messages.len();

    let report = ctrl.handle(InputCommand::Previous, InputSource::Network, &Value::Null);
    assert_eq!(report.invoked, 0);
    assert_eq!(hw(&ctrl).messages.len(), shown);
}

// ── Held buttons ──────────────────────────────────────────────

#[test]
fn holding_select_in_capture_stops_exactly_once() {
    let (mut ctrl, _, queue) = make_controller(MockRig::new());
    press(&mut ctrl, ButtonId::Select);
    assert_eq!(ctrl.active_scope(), SCOPE_CAPTURE);

    let scopes = hold(&mut ctrl, &queue, ButtonId::Select, 1000);

    assert_eq!(scopes, [SCOPE_CAPTURE, SCOPE_MENU]);
    assert!(!ctrl.rig().capture().is_active());
    assert_eq!(hw(&ctrl).count(&HwCall::Calibrate), 1, "no second session");
}

#[test]
fn holding_next_in_capture_pauses_once() {
    let (mut ctrl, _, queue) = make_controller(MockRig::new());
    press(&mut ctrl, ButtonId::Select);

    // Press at 30 ms, first repeat at 630 ms.
    hold(&mut ctrl, &queue, ButtonId::Next, 700);

    assert!(ctrl.rig().capture().is_paused());
}

#[test]
fn holding_select_on_shutdown_fires_once() {
    let (mut ctrl, _, queue) = make_controller(MockRig::new());
    remote(&mut ctrl, InputCommand::Previous); // wraps to "System"
    press(&mut ctrl, ButtonId::Select);
    let target = ctrl.rig().menu().tree().find("Shutdown").unwrap();
    while ctrl.rig().menu().current_id() != target {
        press(&mut ctrl, ButtonId::Next);
    }

    hold(&mut ctrl, &queue, ButtonId::Select, 1000);

    assert_eq!(hw(&ctrl).count(&HwCall::Shutdown), 1);
}

#[test]
fn holding_next_in_menu_scrolls() {
    let (mut ctrl, _, queue) = make_controller(MockRig::new());
    let before = hw(&ctrl).messages.len();

    // Press at 30 ms, repeats at 630 and 830 ms.
    hold(&mut ctrl, &queue, ButtonId::Next, 900);

    assert_eq!(hw(&ctrl).messages.len() - before, 3);
    assert_eq!(ctrl.active_scope(), SCOPE_MENU);
}

// ── Info screen ───────────────────────────────────────────────

#[test]
fn system_info_enters_and_leaves_info_scope() {
    let (mut ctrl, _, _) = make_controller(MockRig::new());

    remote(&mut ctrl, InputCommand::Previous); // System
    press(&mut ctrl, ButtonId::Select); // System Info
    press(&mut ctrl, ButtonId::Select);

    assert_eq!(ctrl.active_scope(), SCOPE_INFO);
    assert_eq!(hw(&ctrl).count(&HwCall::SystemInfo), 1);
    assert_eq!(hw(&ctrl).last_message(), Some("IP: 192.168.4.1"));

    press(&mut ctrl, ButtonId::Next);
    assert_eq!(ctrl.active_scope(), SCOPE_MENU);
    assert_eq!(hw(&ctrl).last_message(), Some("System Info"));
}

// ── Failure isolation ─────────────────────────────────────────

#[test]
fn failing_power_callback_is_reported_not_fatal() {
    let mut rig = MockRig::new();
    rig.power_fails = true;
    let (mut ctrl, _, _) = make_controller(rig);

    let report = ctrl.handle(InputCommand::Shutdown, InputSource::Network, &Value::Null);
    assert_eq!(report.invoked, 1);
    assert_eq!(report.failed, 1);

    press(&mut ctrl, ButtonId::Next);
    assert_eq!(hw(&ctrl).last_message(), Some("Camera Settings"));
}

#[test]
fn panicking_extra_binding_does_not_block_menu() {
    let (mut ctrl, _, _) = make_controller(MockRig::new());
    ctrl.handler_mut().register(
        SCOPE_MENU,
        InputCommand::Next,
        callback(|_, _, _| panic!("listener bug")),
    );

    let report = ctrl.handle(InputCommand::Next, InputSource::Gpio, &Value::Null);
    assert_eq!(report.invoked, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(hw(&ctrl).last_message(), Some("Camera Settings"));
}

// ── Queue ─────────────────────────────────────────────────────

#[test]
fn tick_drains_queued_events_in_order() {
    let (mut ctrl, _, queue) = make_controller(MockRig::new());

    queue.push(InputEvent::press(ButtonId::Next));
    queue.push(InputEvent::command(InputCommand::Next, InputSource::Network));
    queue.push(InputEvent::command(InputCommand::Previous, InputSource::System));
    ctrl.tick();

    assert!(queue.is_empty());
    assert_eq!(hw(&ctrl).last_message(), Some("Camera Settings"));
}

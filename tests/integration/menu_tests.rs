//! Integration tests for menu definitions loaded from JSON.

use pikite::error::{DefinitionError, MenuError};
use pikite::menu::{ActionOutcome, ElementTag, Menu, MenuAction, MenuNode};

use crate::mock_hw::{HwCall, MockRig};

const DEFINITION: &str = r#"{
    "tag": "menu",
    "name": "Root",
    "children": [
        { "tag": "menu_item", "name": "Go", "message": "Launch", "action": "start_capture" },
        {
            "tag": "menu_item", "name": "Mode", "message": "Mode",
            "action": "options", "setting": "cam_take_photos",
            "children": [
                { "tag": "option_item", "name": "Pic", "message": "Mode: Pic",
                  "action": "selectOption", "value": "pic" },
                { "tag": "option_item", "name": "Vid", "message": "Mode: Vid",
                  "action": "selectOption", "value": "vid" },
                { "tag": "menu_item", "name": "Stray" }
            ]
        },
        {
            "tag": "menu_item", "name": "More", "message": "More", "action": "submenu",
            "children": [
                { "tag": "menu_item", "name": "Reset", "message": "Reset",
                  "action": "load_defaults" },
                { "tag": "menu_item", "name": "Off", "message": "Power Off", "action": "shutdown" },
                { "tag": "menu_item", "message": "No name", "action": "blink" },
                { "tag": "menu_item", "name": "Up", "message": "Back", "action": "return" }
            ]
        }
    ]
}"#;

fn load() -> Menu {
    Menu::from_definition(&MenuNode::from_json(DEFINITION).unwrap()).unwrap()
}

#[test]
fn definition_builds_expected_tree() {
    let menu = load();
    let tree = menu.tree();

    let mode = tree.get(tree.find("Mode").unwrap()).unwrap();
    assert_eq!(mode.options.as_ref().map(Vec::len), Some(2), "stray menu_item dropped");
    assert!(mode.submenu.is_none());

    let nameless = tree
        .get(tree.find("Tag: menu_item").unwrap())
        .unwrap();
    assert_eq!(nameless.message, "No name");
    assert_eq!(nameless.action, MenuAction::Pass);
    assert_eq!(nameless.tag, ElementTag::MenuItem);
}

#[test]
fn full_settings_round_trip_through_options() {
    let mut menu = load();
    let mut rig = MockRig::new().with_setting("cam_take_photos", "vid");

    menu.increment_element(&mut rig); // Mode
    assert_eq!(menu.do_action(&mut rig), ActionOutcome::Moved);
    assert_eq!(rig.last_message(), Some("Mode: Vid"), "cursor lands on stored value");

    menu.increment_element(&mut rig); // wraps to Pic
    assert_eq!(rig.last_message(), Some("Mode: Pic"));

    assert_eq!(menu.do_action(&mut rig), ActionOutcome::Moved);
    assert_eq!(rig.settings["cam_take_photos"], "pic");
    assert_eq!(menu.current().name, "Mode");
}

#[test]
fn unmatched_stored_value_stays_put() {
    let mut menu = load();
    let mut rig = MockRig::new().with_setting("cam_take_photos", "timelapse");

    menu.increment_element(&mut rig);
    let shown = rig.messages.len();
    assert_eq!(menu.do_action(&mut rig), ActionOutcome::Ignored);
    assert_eq!(menu.current().name, "Mode");
    assert_eq!(rig.messages.len(), shown);
}

#[test]
fn submenu_actions_delegate_to_ports() {
    let mut menu = load();
    let mut rig = MockRig::new().with_setting("pic_interval", "30");

    menu.decrement_element(&mut rig); // More
    menu.do_action(&mut rig); // Reset
    assert_eq!(rig.last_message(), Some("Reset"));

    assert_eq!(menu.do_action(&mut rig), ActionOutcome::Moved);
    assert_eq!(rig.settings["pic_interval"], "5");
    assert_eq!(menu.current().name, "Go", "defaults send the cursor home");

    menu.decrement_element(&mut rig);
    menu.do_action(&mut rig);
    menu.increment_element(&mut rig); // Off
    assert_eq!(menu.do_action(&mut rig), ActionOutcome::Delegated);
    assert_eq!(rig.count(&HwCall::Shutdown), 1);

    menu.increment_element(&mut rig); // nameless
    assert_eq!(menu.do_action(&mut rig), ActionOutcome::Ignored);

    menu.increment_element(&mut rig); // Up
    assert_eq!(menu.do_action(&mut rig), ActionOutcome::Moved);
    assert_eq!(rig.last_message(), Some("More"));
}

#[test]
fn launch_item_requests_capture() {
    let mut menu = load();
    let mut rig = MockRig::new();
    assert_eq!(menu.do_action(&mut rig), ActionOutcome::CaptureRequested);
    assert!(rig.calls.is_empty());
}

#[test]
fn empty_root_is_rejected() {
    let node = MenuNode::from_json(r#"{"tag":"menu","name":"Root"}"#).unwrap();
    assert!(matches!(Menu::from_definition(&node), Err(MenuError::EmptyRoot)));
}

#[test]
fn menu_file_is_loaded_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.json");
    std::fs::write(&path, DEFINITION).unwrap();

    let menu = Menu::load(&path).unwrap();
    assert_eq!(menu.current().name, "Go");
}

#[test]
fn unreadable_menu_file_is_a_definition_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    assert!(matches!(
        Menu::load(&missing),
        Err(MenuError::Definition(DefinitionError::Io(_)))
    ));

    let broken = dir.path().join("broken.json");
    std::fs::write(&broken, "{ \"tag\": ").unwrap();
    assert!(matches!(
        Menu::load(&broken),
        Err(MenuError::Definition(DefinitionError::Parse(_)))
    ));
}

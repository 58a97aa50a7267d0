//! Fuzz target: menu definition → `MenuTree` → `Menu` navigation
//!
//! Any definition that parses must build a tree whose parent links stay
//! in bounds, and a menu built from it must survive arbitrary cursor
//! movement without panicking.
//!
//! cargo fuzz run fuzz_menu_definition

#![no_main]

use libfuzzer_sys::fuzz_target;
use pikite::app::ports::DisplayPort;
use pikite::menu::{ElementId, Menu, MenuNode, MenuTree};

struct Sink;

impl DisplayPort for Sink {
    fn print_message(&mut self, _message: &str) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(node) = MenuNode::from_json(text) else {
        return;
    };

    let tree = MenuTree::build(&node);
    for i in 0..tree.len() {
        let element = tree.get(ElementId(i)).expect("dense arena");
        assert!(element.parent.0 < tree.len());
    }

    let Ok(mut menu) = Menu::new(tree) else {
        return;
    };
    for (i, byte) in data.iter().enumerate().take(64) {
        match byte % 3 {
            0 => menu.increment_element(&mut Sink),
            1 => menu.decrement_element(&mut Sink),
            _ => {
                menu.ascend(&mut Sink);
            }
        }
        if i % 8 == 7 {
            menu.restart(&mut Sink);
        }
    }
});

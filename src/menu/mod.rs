//! Menu state machine: a cursor over an immutable [`MenuTree`].
//!
//! ```text
//!   increment / decrement ──▶ move within the sibling list (wraps)
//!   do_action             ──▶ match current.action
//!       Submenu       → first submenu child
//!       Options       → option matching the current setting value
//!       SelectOption  → write value to parent.setting, go to parent
//!       Return        → parent
//!       LoadDefaults  → reload settings, back to default element
//!       Info/Power    → delegate, cursor unchanged
//! ```
//!
//! Every successful move re-renders the current element's message on the
//! display port.

pub mod tree;

use core::fmt;
use std::path::Path;

use log::{debug, error, warn};

use crate::app::ports::{DisplayPort, MenuPorts};
use crate::error::MenuError;

pub use tree::{ElementId, ElementTag, MenuAction, MenuElement, MenuNode, MenuTree};

/// What [`Menu::do_action`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The cursor moved and the display was updated.
    Moved,
    /// A power action was handed to the power port.
    Delegated,
    /// System info is on the display; the caller decides how to leave it.
    InfoShown,
    /// The element asks to start a capture session.
    CaptureRequested,
    /// Nothing happened (misconfigured element, failed collaborator, pass).
    Ignored,
}

pub struct Menu {
    tree: MenuTree,
    current: ElementId,
    default: ElementId,
}

impl Menu {
    /// Fails when the root has no `menu_item` children.
    pub fn new(tree: MenuTree) -> Result<Self, MenuError> {
        let Some(&first) = tree.root().submenu.as_ref().and_then(|s| s.first()) else {
            error!("Root menu must not be empty");
            return Err(MenuError::EmptyRoot);
        };
        for &id in tree.root().submenu.iter().flatten() {
            if let Some(item) = tree.get(id).filter(|e| e.action == MenuAction::Return) {
                warn!("Top-level '{}' returns to the root; Back leaves it", item.name);
            }
        }
        Ok(Self {
            tree,
            current: first,
            default: first,
        })
    }

    pub fn from_definition(definition: &MenuNode) -> Result<Self, MenuError> {
        Self::new(MenuTree::build(definition))
    }

    /// Read a JSON menu definition from `path` and build the menu.
    pub fn load(path: &Path) -> Result<Self, MenuError> {
        Self::from_definition(&MenuNode::load(path)?)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn current_id(&self) -> ElementId {
        self.current
    }

    pub fn default_id(&self) -> ElementId {
        self.default
    }

    pub fn current(&self) -> &MenuElement {
        self.element(self.current)
    }

    /// Element by id.  Ids handed out by this menu are always valid; an
    /// unknown id yields the root.
    pub fn element(&self, id: ElementId) -> &MenuElement {
        self.tree.get(id).unwrap_or_else(|| self.tree.root())
    }

    pub fn previous_element(&self) -> ElementId {
        self.adjacent(-1)
    }

    pub fn next_element(&self) -> ElementId {
        self.adjacent(1)
    }

    /// The list the cursor moves through: the parent's options for an
    /// option item, otherwise the parent's submenu.
    fn siblings(&self) -> Option<&[ElementId]> {
        let current = self.current();
        let parent = self.element(current.parent);
        if current.tag == ElementTag::OptionItem {
            if let Some(opts) = parent.options.as_deref() {
                return Some(opts);
            }
        }
        parent.submenu.as_deref()
    }

    fn adjacent(&self, step: isize) -> ElementId {
        let Some(list) = self.siblings() else {
            warn!("'{}' has no sibling list", self.current().name);
            return self.current;
        };
        let Some(pos) = list.iter().position(|&id| id == self.current) else {
            warn!("'{}' is not among its siblings", self.current().name);
            return self.current;
        };
        let len = list.len() as isize;
        let idx = (pos as isize + step).rem_euclid(len);
        list[idx as usize]
    }

    // ── Navigation ────────────────────────────────────────────

    /// Render the current element.
    pub fn start(&self, display: &mut impl DisplayPort) {
        self.render(display);
    }

    /// Move to the next sibling, wrapping from last to first.
    pub fn increment_element(&mut self, display: &mut impl DisplayPort) {
        self.current = self.next_element();
        self.render(display);
    }

    /// Move to the previous sibling, wrapping from first to last.
    pub fn decrement_element(&mut self, display: &mut impl DisplayPort) {
        self.current = self.previous_element();
        self.render(display);
    }

    /// Back to the default element without rendering.
    pub fn reset(&mut self) {
        self.current = self.default;
    }

    pub fn restart(&mut self, display: &mut impl DisplayPort) {
        self.reset();
        self.render(display);
    }

    /// Move to the parent unless it is the root.  A cursor parked on the
    /// root itself goes back to the default element.  Returns whether the
    /// cursor moved.
    pub fn ascend(&mut self, display: &mut impl DisplayPort) -> bool {
        if self.current == MenuTree::ROOT {
            self.restart(display);
            return true;
        }
        let parent = self.current().parent;
        if parent == MenuTree::ROOT {
            return false;
        }
        self.current = parent;
        self.render(display);
        true
    }

    /// Run the current element's action.
    pub fn do_action(&mut self, ports: &mut impl MenuPorts) -> ActionOutcome {
        let current = self.current().clone();

        match current.action {
            MenuAction::Submenu => {
                let Some(&first) = current.submenu.as_ref().and_then(|s| s.first()) else {
                    error!("'submenu' action on '{}' without a submenu", current.name);
                    return ActionOutcome::Ignored;
                };
                self.current = first;
            }
            MenuAction::Options => {
                let (Some(options), Some(setting)) = (&current.options, &current.setting) else {
                    error!("'options' action on '{}' without options or setting", current.name);
                    return ActionOutcome::Ignored;
                };
                let value = ports.get(setting);
                let found = options.iter().copied().find(|&id| {
                    let option = self.element(id);
                    option.value.is_some() && option.value == value
                });
                let Some(found) = found else {
                    error!("No option of '{}' matches {} = {:?}", current.name, setting, value);
                    return ActionOutcome::Ignored;
                };
                self.current = found;
            }
            MenuAction::SelectOption => {
                let setting = self.element(current.parent).setting.clone();
                let (Some(setting), Some(value)) = (setting, &current.value) else {
                    error!("'selectOption' on '{}' without parent setting or value", current.name);
                    return ActionOutcome::Ignored;
                };
                if let Err(e) = ports.set(&setting, value) {
                    error!("Failed to store {} = {}: {}", setting, value, e);
                    return ActionOutcome::Ignored;
                }
                self.current = current.parent;
            }
            MenuAction::Return => {
                self.current = current.parent;
            }
            MenuAction::LoadDefaults => {
                if let Err(e) = ports.load_defaults() {
                    error!("Failed to load default settings: {}", e);
                }
                self.reset();
            }
            MenuAction::DisplaySystemInfo => {
                return match ports.display_system_info() {
                    Ok(()) => ActionOutcome::InfoShown,
                    Err(e) => {
                        error!("System info unavailable: {}", e);
                        ActionOutcome::Ignored
                    }
                };
            }
            MenuAction::Shutdown => {
                if let Err(e) = ports.shutdown() {
                    error!("Shutdown failed: {}", e);
                    return ActionOutcome::Ignored;
                }
                return ActionOutcome::Delegated;
            }
            MenuAction::Reboot => {
                if let Err(e) = ports.reboot() {
                    error!("Reboot failed: {}", e);
                    return ActionOutcome::Ignored;
                }
                return ActionOutcome::Delegated;
            }
            MenuAction::StartCapture => return ActionOutcome::CaptureRequested,
            MenuAction::Pass => {
                warn!("No action defined for menu element '{}'", current.name);
                return ActionOutcome::Ignored;
            }
        }

        self.render(ports);
        ActionOutcome::Moved
    }

    fn render(&self, display: &mut (impl DisplayPort + ?Sized)) {
        let current = self.current();
        display.print_message(&current.message);
        debug!("Menu at '{}' ({})", current.name, current.action.as_str());
    }
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.current().message)
    }
}

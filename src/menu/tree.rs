//! Menu definition and the immutable element arena built from it.
//!
//! A definition is a JSON tree of [`MenuNode`]s:
//!
//! ```json
//! { "tag": "menu", "name": "PiKite", "children": [
//!     { "tag": "menu_item", "name": "Capture Mode", "action": "options",
//!       "setting": "cam_take_photos", "children": [
//!         { "tag": "option_item", "name": "Photos", "value": "pic",
//!           "action": "selectOption" } ] } ] }
//! ```
//!
//! [`MenuTree::build`] flattens it into a `Vec<MenuElement>` addressed by
//! [`ElementId`].  Every element stores its parent's index; the root stores
//! its own.

use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;

// ── Vocabulary ────────────────────────────────────────────────

/// Structural kind of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementTag {
    Menu,
    MenuItem,
    OptionItem,
}

impl ElementTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::MenuItem => "menu_item",
            Self::OptionItem => "option_item",
        }
    }
}

/// What selecting an element does.  Closed set; there is no way to run
/// arbitrary code from a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Submenu,
    Return,
    Options,
    SelectOption,
    LoadDefaults,
    DisplaySystemInfo,
    Shutdown,
    Reboot,
    StartCapture,
    Pass,
}

impl MenuAction {
    /// Parse a definition's action name.  Unknown names are logged and
    /// become [`MenuAction::Pass`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "submenu" => Self::Submenu,
            "return" => Self::Return,
            "options" => Self::Options,
            "selectOption" => Self::SelectOption,
            "load_defaults" => Self::LoadDefaults,
            "display_system_info" => Self::DisplaySystemInfo,
            "shutdown" => Self::Shutdown,
            "reboot" => Self::Reboot,
            "start_capture" => Self::StartCapture,
            "pass" => Self::Pass,
            other => {
                warn!("Unknown menu action '{}', treating as pass", other);
                Self::Pass
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submenu => "submenu",
            Self::Return => "return",
            Self::Options => "options",
            Self::SelectOption => "selectOption",
            Self::LoadDefaults => "load_defaults",
            Self::DisplaySystemInfo => "display_system_info",
            Self::Shutdown => "shutdown",
            Self::Reboot => "reboot",
            Self::StartCapture => "start_capture",
            Self::Pass => "pass",
        }
    }
}

// ── Definition ────────────────────────────────────────────────

/// One node of a menu definition, as parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuNode {
    pub tag: ElementTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Settings key controlled by this node's options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
}

impl MenuNode {
    pub fn from_json(text: &str) -> Result<Self, DefinitionError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, DefinitionError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    fn node(tag: ElementTag, name: &str, message: &str, action: &str) -> Self {
        Self {
            tag,
            name: Some(name.to_string()),
            message: Some(message.to_string()),
            action: Some(action.to_string()),
            value: None,
            setting: None,
            children: Vec::new(),
        }
    }

    fn item(name: &str, message: &str, action: &str) -> Self {
        Self::node(ElementTag::MenuItem, name, message, action)
    }

    fn submenu(name: &str, children: Vec<Self>) -> Self {
        let mut node = Self::item(name, name, "submenu");
        node.children = children;
        node.children.push(Self::item("Back", "Back", "return"));
        node
    }

    /// A `menu_item` whose options write `setting`.  `choices` are
    /// `(label, value)` pairs.
    fn options(name: &str, setting: &str, choices: &[(&str, &str)]) -> Self {
        let mut node = Self::item(name, name, "options");
        node.setting = Some(setting.to_string());
        node.children = choices
            .iter()
            .map(|(label, value)| {
                let mut opt = Self::node(
                    ElementTag::OptionItem,
                    label,
                    &format!("{name}: {label}"),
                    "selectOption",
                );
                opt.value = Some((*value).to_string());
                opt
            })
            .collect();
        node
    }

    /// The stock PiKite menu.
    pub fn builtin() -> Self {
        let mut root = Self::node(ElementTag::Menu, "PiKite", "PiKite", "pass");
        root.children = vec![
            Self::item("Launch", "Start PiKite", "start_capture"),
            Self::submenu(
                "Camera Settings",
                vec![
                    Self::options(
                        "Capture Mode",
                        "cam_take_photos",
                        &[("Photos", "pic"), ("Video", "vid"), ("Altitude Only", "none")],
                    ),
                    Self::options(
                        "Start Delay",
                        "cam_recording_delay",
                        &[("0s", "0"), ("10s", "10"), ("30s", "30"), ("60s", "60")],
                    ),
                ],
            ),
            Self::submenu(
                "Photo Settings",
                vec![
                    Self::options(
                        "Photo Interval",
                        "pic_interval",
                        &[("2s", "2"), ("5s", "5"), ("10s", "10"), ("30s", "30")],
                    ),
                    Self::options(
                        "Annotations",
                        "pic_annotations",
                        &[
                            ("None", "none"),
                            ("Altitude", "alt"),
                            ("Time", "time"),
                            ("Alt + Time", "alttime"),
                        ],
                    ),
                ],
            ),
            Self::submenu(
                "Video Settings",
                vec![
                    Self::options(
                        "Video Length",
                        "vid_length",
                        &[("30s", "30"), ("60s", "60"), ("5min", "300")],
                    ),
                    Self::options(
                        "Multiple Videos",
                        "vid_multiple",
                        &[("Yes", "yes"), ("No", "no")],
                    ),
                    Self::options(
                        "Video Interval",
                        "vid_interval",
                        &[("30s", "30"), ("60s", "60"), ("5min", "300")],
                    ),
                ],
            ),
            Self::submenu(
                "Altitude Settings",
                vec![Self::options(
                    "Reading Interval",
                    "alt_reading_interval",
                    &[("1s", "1"), ("5s", "5"), ("10s", "10")],
                )],
            ),
            Self::submenu(
                "Pan/Tilt Settings",
                vec![
                    Self::options("Pan/Tilt", "pan_enabled", &[("On", "yes"), ("Off", "no")]),
                    Self::options(
                        "Step Interval",
                        "pan_interval",
                        &[("5s", "5"), ("10s", "10"), ("30s", "30")],
                    ),
                ],
            ),
            Self::submenu(
                "System",
                vec![
                    Self::item("System Info", "System Info", "display_system_info"),
                    Self::options(
                        "Log Level",
                        "log_level",
                        &[
                            ("Debug", "DEBUG"),
                            ("Info", "INFO"),
                            ("Warning", "WARNING"),
                            ("Error", "ERROR"),
                        ],
                    ),
                    Self::item("Load Defaults", "Load Defaults", "load_defaults"),
                    Self::item("Reboot", "Reboot", "reboot"),
                    Self::item("Shutdown", "Shutdown", "shutdown"),
                ],
            ),
        ];
        root
    }
}

// ── Arena ─────────────────────────────────────────────────────

/// Index of an element in its [`MenuTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub usize);

/// One navigable element.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuElement {
    pub tag: ElementTag,
    pub name: String,
    /// Text or image directive handed to the display.
    pub message: String,
    pub action: MenuAction,
    /// The root points at itself.
    pub parent: ElementId,
    pub value: Option<String>,
    pub setting: Option<String>,
    /// `option_item` children; only when `action == Options`.
    pub options: Option<Vec<ElementId>>,
    /// `menu_item` children; only for `menu` or `action == Submenu`.
    pub submenu: Option<Vec<ElementId>>,
}

/// Immutable element arena.  Index 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuTree {
    elements: Vec<MenuElement>,
}

impl MenuTree {
    pub const ROOT: ElementId = ElementId(0);

    pub fn build(definition: &MenuNode) -> Self {
        let mut tree = Self {
            elements: Vec::new(),
        };
        tree.insert(definition, None);
        tree
    }

    fn insert(&mut self, node: &MenuNode, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len());
        let fallback = format!("Tag: {}", node.tag.as_str());
        let action = node
            .action
            .as_deref()
            .map_or(MenuAction::Pass, MenuAction::from_name);

        self.elements.push(MenuElement {
            tag: node.tag,
            name: node.name.clone().unwrap_or_else(|| fallback.clone()),
            message: node.message.clone().unwrap_or(fallback),
            action,
            parent: parent.unwrap_or(id),
            value: node.value.clone(),
            setting: node.setting.clone(),
            options: None,
            submenu: None,
        });

        let (wanted, is_options) = if action == MenuAction::Options {
            (Some(ElementTag::OptionItem), true)
        } else if node.tag == ElementTag::Menu || action == MenuAction::Submenu {
            (Some(ElementTag::MenuItem), false)
        } else {
            (None, false)
        };

        if let Some(wanted) = wanted {
            let children: Vec<ElementId> = node
                .children
                .iter()
                .filter(|c| c.tag == wanted)
                .map(|c| self.insert(c, Some(id)))
                .collect();
            if !children.is_empty() {
                if is_options {
                    self.elements[id.0].options = Some(children);
                } else {
                    self.elements[id.0].submenu = Some(children);
                }
            }
        }
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&MenuElement> {
        self.elements.get(id.0)
    }

    pub fn root(&self) -> &MenuElement {
        &self.elements[Self::ROOT.0]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// First element whose name matches.
    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|e| e.name == name)
            .map(ElementId)
    }
}

//! JSON file settings adapter.
//!
//! Implements [`SettingsPort`] over a JSON file grouped into sections.  A
//! key's section is chosen by its prefix:
//!
//! | Prefix | Section             |
//! |--------|---------------------|
//! | `alt`  | `altitude_settings` |
//! | `cam`  | `camera_settings`   |
//! | `pic`  | `photo_settings`    |
//! | `vid`  | `video_settings`    |
//! | `pan`  | `pan_tilt_settings` |
//! | `log`  | `logging_settings`  |
//!
//! Every `set` rewrites the file (write to a sibling temp file, then
//! rename).  A missing settings file is created from the defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::app::ports::SettingsPort;
use crate::config::DEFAULT_SETTINGS;
use crate::error::SettingsError;

const PREFIX_SECTIONS: &[(&str, &str)] = &[
    ("alt", "altitude_settings"),
    ("cam", "camera_settings"),
    ("pic", "photo_settings"),
    ("vid", "video_settings"),
    ("pan", "pan_tilt_settings"),
    ("log", "logging_settings"),
];

type Sections = BTreeMap<String, BTreeMap<String, String>>;

/// Section holding `key`.
pub fn section_for(key: &str) -> Result<&'static str, SettingsError> {
    PREFIX_SECTIONS
        .iter()
        .find(|(prefix, _)| key.starts_with(prefix))
        .map(|(_, section)| *section)
        .ok_or_else(|| SettingsError::UnknownSection(key.to_string()))
}

fn builtin_defaults() -> Sections {
    let mut sections = Sections::new();
    for (key, value) in DEFAULT_SETTINGS {
        if let Ok(section) = section_for(key) {
            sections
                .entry(section.to_string())
                .or_default()
                .insert((*key).to_string(), (*value).to_string());
        }
    }
    sections
}

pub struct FileSettings {
    path: PathBuf,
    defaults_path: Option<PathBuf>,
    sections: Sections,
}

impl FileSettings {
    /// Open `path`, creating it from the defaults when missing.
    pub fn open(path: &Path, defaults_path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut settings = Self {
            path: path.to_path_buf(),
            defaults_path: defaults_path.map(Path::to_path_buf),
            sections: Sections::new(),
        };

        if path.exists() {
            let text = fs::read_to_string(path)?;
            settings.sections = serde_json::from_str(&text)?;
            info!("Settings loaded from {}", path.display());
        } else {
            error!("Settings file {} not found, creating from defaults", path.display());
            settings.load_defaults()?;
        }
        Ok(settings)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(&self.sections)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SettingsPort for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        let section = match section_for(key) {
            Ok(s) => s,
            Err(e) => {
                error!("{}", e);
                return None;
            }
        };
        let value = self.sections.get(section).and_then(|s| s.get(key)).cloned();
        if value.is_none() {
            warn!("Setting '{}' not found in section '{}'", key, section);
        }
        value
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let section = section_for(key)?;
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.save()?;
        info!("Setting {} = {}", key, value);
        Ok(())
    }

    fn load_defaults(&mut self) -> Result<(), SettingsError> {
        self.sections = match &self.defaults_path {
            Some(defaults) => {
                let text = fs::read_to_string(defaults)?;
                serde_json::from_str(&text)?
            }
            None => builtin_defaults(),
        };
        self.save()?;
        info!("Default settings loaded into {}", self.path.display());
        Ok(())
    }
}

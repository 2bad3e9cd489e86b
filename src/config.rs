//! Read-only input configuration
//!
//! Loaded from `<config_dir>/emu-input/input.toml`. Every field has a default,
//! so a missing file or a partial file is fine. Names that do not resolve to a
//! key code or menu button are skipped with a warning.

use crate::controller::input_host::PlatformData;
use crate::controller::keycode::{KeyCode, KeyNames};
use crate::controller::modifier::ModifierPair;
use crate::mapping::{BindType, DefaultBind, MenuMap};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const CONFIG_DIR_NAME: &str = "emu-input";
pub const CONFIG_FILE_NAME: &str = "input.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("No config directory available")]
    NoConfigDir,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ModifierEntry {
    pub in_key: String,
    pub out_key: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct BindingEntry {
    pub key: String,
    pub bind_type: BindType,
    pub actions: u32,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub key: String,
    pub button: String,
}

// Renames a single code, e.g. for a handheld's labelled buttons
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct KeyNameEntry {
    pub code: u16,
    pub name: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct InputConfig {
    pub name_prefix: String,
    pub allow_unbound_modifiers: bool,
    pub modifier_key: Option<String>,
    pub modifier_map: Vec<ModifierEntry>,
    pub key_names: Vec<KeyNameEntry>,
    pub bindings: Vec<BindingEntry>,
    pub joy_bindings: Vec<BindingEntry>,
    // Empty lists fall back to the built-in menu maps
    pub menu_keys: Vec<MenuEntry>,
    pub menu_joy: Vec<MenuEntry>,
    pub poll_interval_ms: u64,
    pub log_level: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            name_prefix: "gilrs:".to_string(),
            allow_unbound_modifiers: false,
            modifier_key: None,
            modifier_map: Vec::new(),
            key_names: Vec::new(),
            bindings: Vec::new(),
            joy_bindings: Vec::new(),
            menu_keys: Vec::new(),
            menu_joy: Vec::new(),
            poll_interval_ms: 16,
            log_level: "info".to_string(),
        }
    }
}

impl InputConfig {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading input config from {}", path.display());
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Loads `path` (or the default location); a missing file yields defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };
        if !path.exists() {
            info!(
                "No input config at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        let config = Self::load(&path)?;
        info!("Loaded input config from {}", path.display());
        Ok(config)
    }

    /// Resolves all names into the registration data used by the host
    pub fn to_platform_data(&self) -> PlatformData {
        let mut key_names = KeyNames::default();
        for entry in &self.key_names {
            match KeyCode::new(entry.code) {
                Some(code) => key_names.set(code, entry.name.clone()),
                None => warn!("Ignoring name {:?} for invalid code {}", entry.name, entry.code),
            }
        }

        let modifier = self.modifier_key.as_deref().and_then(|name| {
            let code = key_names.find(name);
            if code.is_none() {
                warn!("Unknown modifier key {:?}, combos disabled", name);
            }
            code
        });

        let modifier_map = self
            .modifier_map
            .iter()
            .filter_map(|entry| {
                match (key_names.find(&entry.in_key), key_names.find(&entry.out_key)) {
                    (Some(in_key), Some(out_key)) => Some(ModifierPair::new(in_key, out_key)),
                    _ => {
                        warn!(
                            "Ignoring modifier pair {} -> {}",
                            entry.in_key, entry.out_key
                        );
                        None
                    }
                }
            })
            .collect();

        let key_menu = if self.menu_keys.is_empty() {
            MenuMap::default_keyboard()
        } else {
            MenuMap::from_names(menu_pairs(&self.menu_keys), &key_names)
        };
        let joy_menu = if self.menu_joy.is_empty() {
            MenuMap::default_joystick()
        } else {
            MenuMap::from_names(menu_pairs(&self.menu_joy), &key_names)
        };

        PlatformData {
            defaults: resolve_binds(&self.bindings, &key_names),
            joy_defaults: resolve_binds(&self.joy_bindings, &key_names),
            key_names,
            modifier,
            modifier_map,
            key_menu,
            joy_menu,
        }
    }
}

fn menu_pairs(entries: &[MenuEntry]) -> impl Iterator<Item = (&str, &str)> {
    entries
        .iter()
        .map(|entry| (entry.key.as_str(), entry.button.as_str()))
}

fn resolve_binds(entries: &[BindingEntry], names: &KeyNames) -> Vec<DefaultBind> {
    entries
        .iter()
        .filter_map(|entry| match names.find(&entry.key) {
            Some(code) => Some(DefaultBind {
                code,
                bind_type: entry.bind_type,
                actions: entry.actions,
            }),
            None => {
                warn!("Ignoring binding for unknown key {:?}", entry.key);
                None
            }
        })
        .collect()
}

//! Persisted user settings.
//!
//! A small JSON blob, `{ "typePriority": [...], "language": "auto" }`, kept
//! next to the config file. Settings are read fresh when a session opens;
//! change notifications arrive as a [`SettingKey`] plus the new JSON value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::config_dir;
use crate::core::rank::TypePriority;
use crate::error::{SpotlightError, SpotlightResult};
use crate::services::i18n::Language;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub type_priority: Vec<String>,
    pub language: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            type_priority: TypePriority::default().tags(),
            language: "auto".to_string(),
        }
    }
}

impl UserSettings {
    pub fn priority(&self) -> TypePriority {
        TypePriority::from_tags(&self.type_priority)
    }

    pub fn language(&self) -> Language {
        Language::parse(&self.language)
    }

    /// Rewrite both values into canonical form.
    pub fn normalized(&self) -> Self {
        Self {
            type_priority: self.priority().tags(),
            language: self.language().as_str().to_string(),
        }
    }

    /// Apply a pushed change.
    pub fn apply(&mut self, key: SettingKey, value: &serde_json::Value) -> SpotlightResult<()> {
        match key {
            SettingKey::TypePriority => {
                let tags: Vec<String> = serde_json::from_value(value.clone())?;
                self.type_priority = TypePriority::from_tags(&tags).tags();
            }
            SettingKey::Language => {
                let tag = value.as_str().ok_or_else(|| {
                    SpotlightError::Settings(format!("language must be a string, got {}", value))
                })?;
                self.language = Language::parse(tag).as_str().to_string();
            }
        }
        Ok(())
    }
}

/// Keys of the settings blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    TypePriority,
    Language,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::TypePriority => "typePriority",
            SettingKey::Language => "language",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SpotlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "typePriority" => Ok(SettingKey::TypePriority),
            "language" => Ok(SettingKey::Language),
            other => Err(SpotlightError::Settings(format!("Unknown setting: {}", other))),
        }
    }
}

/// Where settings are persisted.
pub trait SettingsStore {
    fn load(&self) -> SpotlightResult<UserSettings>;
    fn save(&self, settings: &UserSettings) -> SpotlightResult<()>;
}

/// Settings stored as pretty JSON in one file.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<config_dir>/spotlight/settings.json`.
    pub fn at_default_path() -> Self {
        Self::new(config_dir().join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> SpotlightResult<UserSettings> {
        if !self.path.exists() {
            return Ok(UserSettings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        let settings: UserSettings = serde_json::from_str(&content)
            .map_err(|e| SpotlightError::Settings(format!("Failed to parse settings: {}", e)))?;
        Ok(settings.normalized())
    }

    fn save(&self, settings: &UserSettings) -> SpotlightResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&settings.normalized())?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Load settings, falling back to defaults on any failure.
pub fn load_or_default(store: &dyn SettingsStore) -> UserSettings {
    store.load().unwrap_or_else(|e| {
        tracing::warn!("Using default settings: {}", e);
        UserSettings::default()
    })
}

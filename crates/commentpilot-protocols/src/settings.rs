//! Settings protocol definitions.
//!
//! Settings are owned by an external store and edited by the settings UI.
//! Consumers read a snapshot and follow changes through [`SettingsStore::subscribe`].

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::SettingsError;

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

/// Tone of the generated comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageStyle {
    Formal,
    #[default]
    Casual,
    Friendly,
    Professional,
    Humorous,
}

impl LanguageStyle {
    pub const ALL: [LanguageStyle; 5] = [
        Self::Formal,
        Self::Casual,
        Self::Friendly,
        Self::Professional,
        Self::Humorous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Casual => "casual",
            Self::Friendly => "friendly",
            Self::Professional => "professional",
            Self::Humorous => "humorous",
        }
    }

    /// Lenient lookup: anything unknown is `Casual`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for LanguageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("unknown language style '{}'", s))
    }
}

impl<'de> Deserialize<'de> for LanguageStyle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Self::from_name).unwrap_or_default())
    }
}

/// User settings shared by every component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub language_style: LanguageStyle,

    #[serde(default)]
    pub auto_love: bool,
}

impl Settings {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Checks applied before the settings UI saves.
    pub fn validate_for_save(&self) -> Result<(), SettingsError> {
        if !self.has_api_key() {
            return Err(SettingsError::MissingField("api_key".to_string()));
        }
        Ok(())
    }

    /// Apply one change notification. Returns whether the value changed.
    pub fn apply(&mut self, change: &SettingChange) -> bool {
        let before = self.clone();
        match change.key {
            SettingKey::ApiKey => {
                self.api_key = change.new_value.as_str().unwrap_or_default().to_string();
            }
            SettingKey::LanguageStyle => {
                self.language_style = change
                    .new_value
                    .as_str()
                    .map(LanguageStyle::from_name)
                    .unwrap_or_default();
            }
            SettingKey::AutoLove => {
                self.auto_love = change.new_value.as_bool().unwrap_or(false);
            }
        }
        *self != before
    }

    /// Change notifications turning `self` into `other`.
    pub fn diff(&self, other: &Settings) -> Vec<SettingChange> {
        let mut changes = Vec::new();
        if self.api_key != other.api_key {
            changes.push(SettingChange::new(SettingKey::ApiKey, other.api_key.clone()));
        }
        if self.language_style != other.language_style {
            changes.push(SettingChange::new(
                SettingKey::LanguageStyle,
                other.language_style.as_str(),
            ));
        }
        if self.auto_love != other.auto_love {
            changes.push(SettingChange::new(SettingKey::AutoLove, other.auto_love));
        }
        changes
    }
}

/// Name of a single setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    ApiKey,
    LanguageStyle,
    AutoLove,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::LanguageStyle => "language_style",
            Self::AutoLove => "auto_love",
        }
    }
}

/// Notification that one key changed, carrying its new raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingChange {
    pub key: SettingKey,
    pub new_value: Value,
}

impl SettingChange {
    pub fn new(key: SettingKey, new_value: impl Into<Value>) -> Self {
        Self {
            key,
            new_value: new_value.into(),
        }
    }
}

/// Shared configuration store.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read every setting.
    async fn get_all(&self) -> Result<Settings, SettingsError>;

    /// Replace every setting, notifying subscribers of each changed key.
    async fn set_all(&self, settings: Settings) -> Result<(), SettingsError>;

    /// Subscribe to change notifications from any writer.
    fn subscribe(&self) -> broadcast::Receiver<SettingChange>;
}

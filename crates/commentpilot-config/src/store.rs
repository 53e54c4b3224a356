//! Settings stores.
//!
//! Both stores keep the current settings behind a lock and broadcast one
//! [`SettingChange`] per key that a write actually changed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info};

use commentpilot_protocols::{SettingChange, Settings, SettingsError, SettingsStore};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Settings held in memory only.
pub struct MemorySettingsStore {
    settings: RwLock<Settings>,
    changes: broadcast::Sender<SettingChange>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            settings: RwLock::new(settings),
            changes,
        }
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get_all(&self) -> Result<Settings, SettingsError> {
        Ok(self.settings.read().clone())
    }

    async fn set_all(&self, settings: Settings) -> Result<(), SettingsError> {
        let changes = {
            let mut current = self.settings.write();
            let changes = current.diff(&settings);
            *current = settings;
            changes
        };
        publish(&self.changes, changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingChange> {
        self.changes.subscribe()
    }
}

/// Settings persisted as a TOML file.
///
/// A missing file reads as default settings. Writes go through the cache so
/// that every writer in this process sees the same change notifications.
pub struct FileSettingsStore {
    path: PathBuf,
    cache: RwLock<Option<Settings>>,
    changes: broadcast::Sender<SettingChange>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            path: path.into(),
            cache: RwLock::new(None),
            changes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<Settings, SettingsError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| SettingsError::Serialization(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Settings file {} not found, using defaults", self.path.display());
                Ok(Settings::default())
            }
            Err(e) => Err(SettingsError::Storage(e.to_string())),
        }
    }

    async fn write_file(&self, settings: &Settings) -> Result<(), SettingsError> {
        let content =
            toml::to_string_pretty(settings).map_err(|e| SettingsError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| SettingsError::Storage(e.to_string()))?;
            }
        }

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| SettingsError::Storage(e.to_string()))?;
        info!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn get_all(&self) -> Result<Settings, SettingsError> {
        if let Some(settings) = self.cache.read().clone() {
            return Ok(settings);
        }
        let settings = self.read_file().await?;
        *self.cache.write() = Some(settings.clone());
        Ok(settings)
    }

    async fn set_all(&self, settings: Settings) -> Result<(), SettingsError> {
        let previous = self.get_all().await?;
        self.write_file(&settings).await?;
        let changes = previous.diff(&settings);
        *self.cache.write() = Some(settings);
        publish(&self.changes, changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingChange> {
        self.changes.subscribe()
    }
}

fn publish(sender: &broadcast::Sender<SettingChange>, changes: Vec<SettingChange>) {
    for change in changes {
        debug!("Setting changed: {}", change.key.as_str());
        // No receivers is fine; nobody is listening yet.
        let _ = sender.send(change);
    }
}

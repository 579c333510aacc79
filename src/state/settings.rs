//! App settings persisted as a single JSON object

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::{
    error::Result,
    store::{PersistentStore, SETTINGS_KEY},
};

/// User toggles. Fields missing from stored data take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub notifications: bool,
    pub sound: bool,
    pub vibration: bool,
    pub auto_save_location: bool,
    pub show_floor_option: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications: true,
            sound: true,
            vibration: true,
            auto_save_location: false,
            show_floor_option: true,
        }
    }
}

/// Partial update; absent fields keep their current value
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub notifications: Option<bool>,
    pub sound: Option<bool>,
    pub vibration: Option<bool>,
    pub auto_save_location: Option<bool>,
    pub show_floor_option: Option<bool>,
}

impl Settings {
    pub fn apply(mut self, patch: SettingsPatch) -> Self {
        if let Some(v) = patch.notifications {
            self.notifications = v;
        }
        if let Some(v) = patch.sound {
            self.sound = v;
        }
        if let Some(v) = patch.vibration {
            self.vibration = v;
        }
        if let Some(v) = patch.auto_save_location {
            self.auto_save_location = v;
        }
        if let Some(v) = patch.show_floor_option {
            self.show_floor_option = v;
        }
        self
    }
}

pub struct SettingsStore {
    store: Arc<dyn PersistentStore>,
    /// Held across every read-modify-write of the settings key
    writes: Mutex<()>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self {
            store,
            writes: Mutex::new(()),
        }
    }

    /// Block other settings writers until the guard is dropped
    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().await
    }

    pub async fn load(&self) -> Result<Settings> {
        let Some(raw) = self.store.get(SETTINGS_KEY).await? else {
            return Ok(Settings::default());
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!("Stored settings are corrupt, using defaults: {}", e);
                Ok(Settings::default())
            }
        }
    }

    pub async fn update(&self, patch: SettingsPatch) -> Result<Settings> {
        let _guard = self.writes.lock().await;
        let settings = self.load().await?.apply(patch);
        let json = serde_json::to_string(&settings)?;
        self.store.set(SETTINGS_KEY, &json).await?;

        info!("Settings updated: {:?}", settings);
        Ok(settings)
    }
}

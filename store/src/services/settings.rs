//! Settings service
//!
//! Manages the system settings singleton stored under
//! [`StorageKey::Settings`].

use crate::clock::Clock;
use crate::database::models::{SettingsUpdate, SystemSettings};
use crate::storage::{KvStore, StorageKey};
use std::sync::Arc;

/// Service for managing system settings
#[derive(Clone)]
pub struct SettingsService {
    store: KvStore,
    clock: Arc<dyn Clock>,
}

impl SettingsService {
    pub fn new(store: KvStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Load settings, creating and persisting defaults if none exist
    pub async fn get(&self) -> SystemSettings {
        if let Some(settings) = self.store.get(StorageKey::Settings).await {
            return settings;
        }

        tracing::info!("Settings not found, creating default settings");
        let defaults = SystemSettings::defaults(self.clock.now());
        if !self.store.set(StorageKey::Settings, &defaults).await {
            tracing::warn!("Default settings could not be persisted");
        }
        defaults
    }

    /// Merge `update` into the current settings and stamp `updated_at`
    pub async fn update(&self, update: SettingsUpdate) -> bool {
        let mut settings = self.get().await;
        update.apply_to(&mut settings, self.clock.now());

        let saved = self.store.set(StorageKey::Settings, &settings).await;
        if saved {
            tracing::info!("Settings updated");
        }
        saved
    }

    /// Replace the stored settings wholesale
    pub async fn save(&self, settings: &SystemSettings) -> bool {
        self.store.set(StorageKey::Settings, settings).await
    }
}

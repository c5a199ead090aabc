//! App Core for Shellmarks.
//!
//! Wires settings, the registry store, the bookmark manager and the notifier.

use std::rc::Rc;

use tracing::info;

use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::registry::{MemoryRegistry, RegistryStore, SqliteRegistry};
use crate::services::id_generator::{IdGenerator, RandomIdGenerator};
use crate::services::notifier::{EventLog, ItemNotifier};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::BookmarkError;
use crate::types::settings::StorageBackend;

/// Central application struct.
///
/// `event_log` is subscribed to `notifier` for the lifetime of the app and
/// buffers events until a client drains them. Past its capacity the oldest
/// events are dropped.
pub struct App {
    pub settings_engine: SettingsEngine,
    pub bookmarks: BookmarkManager,
    pub notifier: Rc<ItemNotifier>,
    pub event_log: Rc<EventLog>,
}

impl App {
    /// Loads settings from `config_path` (or the platform default) and opens the store.
    pub fn new(config_path: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings_engine = SettingsEngine::new(config_path);
        settings_engine.load()?;
        Self::from_settings(settings_engine)
    }

    /// Opens the store selected by already-loaded settings.
    pub fn from_settings(settings_engine: SettingsEngine) -> Result<Self, Box<dyn std::error::Error>> {
        let store: Box<dyn RegistryStore> = match settings_engine.get_settings().storage.backend {
            StorageBackend::Memory => Box::new(MemoryRegistry::new()),
            StorageBackend::Sqlite => {
                let path = settings_engine.database_path();
                info!(path = %path.display(), "opening bookmark database");
                Box::new(SqliteRegistry::open(path)?)
            }
        };
        Ok(Self::with_store(settings_engine, store, Box::new(RandomIdGenerator)))
    }

    /// Builds the app around an explicit store and id generator.
    pub fn with_store(
        settings_engine: SettingsEngine,
        store: Box<dyn RegistryStore>,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        let notifier = ItemNotifier::shared();
        let event_log = Rc::new(EventLog::new());
        notifier.subscribe(event_log.clone());

        let root_key = settings_engine.get_settings().storage.root_key.clone();
        let bookmarks = BookmarkManager::new(store, &root_key, notifier.clone(), ids);

        Self {
            settings_engine,
            bookmarks,
            notifier,
            event_log,
        }
    }

    /// Saves the tree when `storage.autosave` is on.
    ///
    /// Returns `Ok(false)` when autosave is off and nothing was written.
    pub fn autosave(&mut self) -> Result<bool, BookmarkError> {
        if !self.settings_engine.get_settings().storage.autosave {
            return Ok(false);
        }
        self.bookmarks.save()?;
        Ok(true)
    }
}

//! Flat key-value settings: the last city search and first-run flags.
//!
//! Two backends share the [`SettingsStore`] trait: a TOML file that is
//! rewritten on every put, and an in-memory map. [`Preferences`] layers the
//! app's typed keys on top.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

pub const KEY_CITY_NAME: &str = "cityName";
pub const KEY_STATE_CODE: &str = "stateCode";
pub const KEY_COUNTRY_CODE: &str = "countryCode";
pub const KEY_PERMISSION_WAS_ASKED: &str = "permissionWasAsked";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

pub trait SettingsStore: Send + Sync + Debug {
    fn get_string(&self, key: &str) -> Option<String>;
    fn put_string(&self, key: &str, value: &str) -> Result<()>;
    /// Missing or non-boolean values read as `false`.
    fn get_bool(&self, key: &str) -> bool;
    fn put_bool(&self, key: &str, value: bool) -> Result<()>;
}

fn string_of(values: &BTreeMap<String, SettingValue>, key: &str) -> Option<String> {
    match values.get(key) {
        Some(SettingValue::Text(s)) => Some(s.clone()),
        _ => None,
    }
}

fn bool_of(values: &BTreeMap<String, SettingValue>, key: &str) -> bool {
    matches!(values.get(key), Some(SettingValue::Bool(true)))
}

#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: Mutex<BTreeMap<String, SettingValue>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_string(&self, key: &str) -> Option<String> {
        string_of(&self.values.lock(), key)
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), SettingValue::Text(value.to_string()));
        Ok(())
    }

    fn get_bool(&self, key: &str) -> bool {
        bool_of(&self.values.lock(), key)
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<()> {
        self.values.lock().insert(key.to_string(), SettingValue::Bool(value));
        Ok(())
    }
}

/// Settings persisted as a flat TOML table.
#[derive(Debug)]
pub struct FileSettingsStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, SettingValue>>,
}

impl FileSettingsStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse settings file: {}", path.display()))?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), entries = values.len(), "opened settings store");

        Ok(Self { path, values: Mutex::new(values) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn put(&self, key: &str, value: SettingValue) -> Result<()> {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value);
        self.flush(&values)
    }

    fn flush(&self, values: &BTreeMap<String, SettingValue>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string(values).context("Failed to serialize settings to TOML")?;

        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write settings file: {}", self.path.display()))
    }
}

impl SettingsStore for FileSettingsStore {
    fn get_string(&self, key: &str) -> Option<String> {
        string_of(&self.values.lock(), key)
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.put(key, SettingValue::Text(value.to_string()))
    }

    fn get_bool(&self, key: &str) -> bool {
        bool_of(&self.values.lock(), key)
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<()> {
        self.put(key, SettingValue::Bool(value))
    }
}

/// Typed accessors over a [`SettingsStore`].
#[derive(Debug, Clone)]
pub struct Preferences {
    store: Arc<dyn SettingsStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySettingsStore::new()))
    }

    pub fn city_name(&self) -> Option<String> {
        self.store.get_string(KEY_CITY_NAME)
    }

    pub fn save_city_name(&self, city_name: &str) -> Result<()> {
        self.store.put_string(KEY_CITY_NAME, city_name)
    }

    pub fn state_code(&self) -> Option<String> {
        self.store.get_string(KEY_STATE_CODE)
    }

    pub fn save_state_code(&self, state_code: &str) -> Result<()> {
        self.store.put_string(KEY_STATE_CODE, state_code)
    }

    pub fn country_code(&self) -> Option<String> {
        self.store.get_string(KEY_COUNTRY_CODE)
    }

    pub fn save_country_code(&self, country_code: &str) -> Result<()> {
        self.store.put_string(KEY_COUNTRY_CODE, country_code)
    }

    pub fn mark_permission_asked(&self) -> Result<()> {
        self.store.put_bool(KEY_PERMISSION_WAS_ASKED, true)
    }

    pub fn permission_was_asked_before(&self) -> bool {
        self.store.get_bool(KEY_PERMISSION_WAS_ASKED)
    }
}

//! User preferences read from the host's string-keyed settings store.
//!
//! Preferences are loaded fresh on every update. Bad values never fail an
//! update: they fall back to the defaults with a warning.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::constants::{DEFAULT_SHOW_BEFORE_HOURS, PREF_SHOW_BEFORE_HOURS};

/// String-keyed settings storage owned by the host.
pub trait PreferenceStore {
    fn get_string(&self, key: &str) -> Option<String>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for &S {
    fn get_string(&self, key: &str) -> Option<String> {
        (**self).get_string(key)
    }
}

/// In-memory store, for hosts that push settings in directly.
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// TOML file of `key = "value"` pairs, re-read on every lookup so edits made by
/// a settings screen apply on the next update.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry. A missing file is an empty store.
    pub fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences from {}", self.path.display()))?;
        let table: toml::Table = toml::from_str(&content)
            .with_context(|| format!("Failed to parse preferences from {}", self.path.display()))?;

        // Settings screens may store numbers unquoted; keep their text form
        Ok(table
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    toml::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect())
    }

    /// Write a single entry, keeping the others.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        let table: toml::Table = values
            .into_iter()
            .map(|(k, v)| (k, toml::Value::String(v)))
            .collect();
        let content = toml::to_string(&table).context("Failed to serialize preferences")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory {}", parent.display())
            })?;
        }
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write preferences to {}", self.path.display()))
    }
}

impl PreferenceStore for FilePreferences {
    fn get_string(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut values) => values.remove(key),
            Err(e) => {
                log_warning!("Ignoring unreadable preferences: {e:#}");
                None
            }
        }
    }
}

/// Preferences that affect one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    /// Lead-time window in hours; 0 means always visible
    pub show_before_hours: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            show_before_hours: DEFAULT_SHOW_BEFORE_HOURS,
        }
    }
}

impl Preferences {
    /// Load from `store`, substituting defaults for missing or bad values.
    pub fn load<S: PreferenceStore + ?Sized>(store: &S) -> Self {
        let show_before_hours = match store.get_string(PREF_SHOW_BEFORE_HOURS) {
            None => DEFAULT_SHOW_BEFORE_HOURS,
            Some(raw) => parse_show_before_hours(&raw).unwrap_or_else(|| {
                log_warning!(
                    "Invalid {PREF_SHOW_BEFORE_HOURS} value '{raw}', using {DEFAULT_SHOW_BEFORE_HOURS}"
                );
                DEFAULT_SHOW_BEFORE_HOURS
            }),
        };

        Self { show_before_hours }
    }
}

/// Parse a decimal hour count. Negative values clamp to 0.
fn parse_show_before_hours(raw: &str) -> Option<u32> {
    let hours: i64 = raw.trim().parse().ok()?;
    Some(u32::try_from(hours.max(0)).unwrap_or(u32::MAX))
}

//! Key/value settings sources.
//!
//! The pipeline only ever asks for `get(key, fallback)`; where the value comes
//! from is up to the caller. Sources can be stacked with [`Layered`] so that
//! command-line flags override a settings file, which overrides the process
//! environment.

use crate::error::{FeedError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, instrument};

/// A string-typed key/value settings source.
pub trait Settings: Send + Sync {
    /// Raw value for `key`, if this source has one.
    fn lookup(&self, key: &str) -> Option<String>;

    /// Value for `key`, or `fallback` when the source has none.
    fn get(&self, key: &str, fallback: &str) -> String {
        self.lookup(key).unwrap_or_else(|| fallback.to_string())
    }
}

/// Reads settings from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSettings;

impl Settings for EnvSettings {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory settings, used for files, CLI overrides and tests.
#[derive(Debug, Default, Clone)]
pub struct MapSettings {
    values: HashMap<String, String>,
}

impl MapSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder form of [`MapSettings::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Load a flat YAML mapping. Scalars are stringified; nested values and
    /// nulls are skipped.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings_error = |reason: String| FeedError::Settings {
            path: path.display().to_string(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| settings_error(e.to_string()))?;
        Self::from_yaml_str(&raw).map_err(settings_error)
    }

    fn from_yaml_str(raw: &str) -> std::result::Result<Self, String> {
        let mapping: HashMap<String, serde_yaml::Value> =
            serde_yaml::from_str(raw).map_err(|e| e.to_string())?;

        let mut settings = Self::new();
        for (key, value) in mapping {
            let value = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                other => {
                    debug!(%key, ?other, "Skipping non-scalar setting");
                    continue;
                }
            };
            settings.set(key, value);
        }
        Ok(settings)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Settings for MapSettings {
    fn lookup(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Two settings sources; `primary` wins when both have a key.
#[derive(Debug, Clone)]
pub struct Layered<A, B> {
    primary: A,
    fallback: B,
}

impl<A, B> Layered<A, B> {
    pub fn new(primary: A, fallback: B) -> Self {
        Self { primary, fallback }
    }
}

impl<A: Settings, B: Settings> Settings for Layered<A, B> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.primary
            .lookup(key)
            .or_else(|| self.fallback.lookup(key))
    }
}

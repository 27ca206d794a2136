// Theme - System / dark / light preference
//
// The preference is the only thing persisted outside the page address. Storage
// failures never surface: reads fall back to `system`, writes are dropped.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Storage key of the theme preference
pub const THEME_STORAGE_KEY: &str = "easy-preview-theme";

/// Theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the operating system's color scheme
    #[default]
    System,
    Dark,
    Light,
}

impl Theme {
    /// Toggle order: system, dark, light, back to system.
    pub const CYCLE: [Theme; 3] = [Theme::System, Theme::Dark, Theme::Light];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::System => "system",
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Label of the toggle button.
    pub fn label(&self) -> &'static str {
        match self {
            Theme::System => "System Theme",
            Theme::Dark => "Dark Mode",
            Theme::Light => "Light Mode",
        }
    }

    /// Icon name of the toggle button.
    pub fn icon(&self) -> &'static str {
        match self {
            Theme::System => "contrast",
            Theme::Dark => "dark_mode",
            Theme::Light => "light_mode",
        }
    }

    /// The theme after this one in the toggle cycle.
    pub fn next(self) -> Theme {
        let index = Theme::CYCLE.iter().position(|t| *t == self).unwrap_or(0);
        Theme::CYCLE[(index + 1) % Theme::CYCLE.len()]
    }

    /// Theme actually applied: `system` resolves to the OS preference.
    pub fn resolve(self, system_prefers_dark: bool) -> Theme {
        match self {
            Theme::System if system_prefers_dark => Theme::Dark,
            Theme::System => Theme::Light,
            other => other,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Theme::CYCLE
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown theme '{}'", s)))
    }
}

/// Client-local key-value storage (localStorage in a browser).
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store, for embedding hosts without persistence and for tests.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object in a file.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());
        std::fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

/// Reads, cycles and stores the theme preference.
pub struct ThemeManager {
    store: Box<dyn PreferenceStore>,
    current: Theme,
}

impl ThemeManager {
    /// Loads the stored preference; any failure or unknown value yields `system`.
    pub fn load(store: Box<dyn PreferenceStore>) -> Self {
        let current = match store.get(THEME_STORAGE_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring stored theme preference: {}", e);
                Theme::System
            }),
            Ok(None) => Theme::System,
            Err(e) => {
                tracing::warn!("Could not read theme preference: {}", e);
                Theme::System
            }
        };
        Self { store, current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// Advances to the next theme and stores it. Returns the new theme.
    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.next();
        if let Err(e) = self.store.set(THEME_STORAGE_KEY, self.current.as_str()) {
            tracing::warn!("Could not save theme preference: {}", e);
        }
        tracing::debug!("Theme changed to: {}", self.current.label());
        self.current
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

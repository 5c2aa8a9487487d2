use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

pub const THEME_KEY: &str = "themeMode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

/// The one visible notification; a new one replaces it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub open: bool,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

/// Local key/value persistence for user preferences
pub trait PreferenceStore: Send + Sync {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Preferences kept as a flat JSON object in `preferences.json`
pub struct FilePreferences {
    path: PathBuf,
}

impl FilePreferences {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("preferences.json"),
        }
    }

    fn read_all(&self) -> anyhow::Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences from {}", self.path.display()))?;
        let value: Value = serde_json::from_str(&content).context("Failed to parse preferences")?;
        Ok(value.as_object().cloned().unwrap_or_default())
    }
}

impl PreferenceStore for FilePreferences {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read_all()?.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn save(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), Value::String(value.to_string()));
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&all)?)
            .with_context(|| format!("Failed to write preferences to {}", self.path.display()))?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> anyhow::Result<()> {
        lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Application-wide UI state, shared by handle rather than as a global.
///
/// The busy indicator is a counter: every in-flight mutation holds a
/// [`BusyGuard`], and the app reads as busy until the last guard drops.
pub struct AppState {
    notification: Mutex<Notification>,
    busy: AtomicUsize,
    theme: Mutex<ThemeMode>,
    preferences: Arc<dyn PreferenceStore>,
}

impl AppState {
    /// Theme is read from `preferences`; unreadable or unknown values fall back to light
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Arc<Self> {
        let theme = match preferences.load(THEME_KEY) {
            Ok(Some(saved)) => saved.parse::<ThemeMode>().unwrap_or_default(),
            Ok(None) => ThemeMode::default(),
            Err(e) => {
                tracing::warn!("Could not load theme preference: {}", e);
                ThemeMode::default()
            }
        };
        Arc::new(Self {
            notification: Mutex::new(Notification::default()),
            busy: AtomicUsize::new(0),
            theme: Mutex::new(theme),
            preferences,
        })
    }

    pub fn in_memory() -> Arc<Self> {
        Self::new(Arc::new(MemoryPreferences::default()))
    }

    pub fn show_notification(&self, message: impl Into<String>, severity: Severity) {
        let mut slot = lock(&self.notification);
        *slot = Notification {
            open: true,
            message: message.into(),
            severity,
        };
    }

    pub fn notify_success(&self, message: impl Into<String>) {
        self.show_notification(message, Severity::Success);
    }

    pub fn notify_error(&self, message: impl Into<String>) {
        self.show_notification(message, Severity::Error);
    }

    /// Closes the notification, keeping its last message and severity
    pub fn hide_notification(&self) {
        lock(&self.notification).open = false;
    }

    pub fn notification(&self) -> Notification {
        lock(&self.notification).clone()
    }

    pub fn begin_busy(self: &Arc<Self>) -> BusyGuard {
        self.busy.fetch_add(1, Ordering::SeqCst);
        BusyGuard {
            state: Arc::clone(self),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy_count() > 0
    }

    pub fn busy_count(&self) -> usize {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn theme(&self) -> ThemeMode {
        *lock(&self.theme)
    }

    /// Applies the mode even if persisting it fails
    pub fn set_theme(&self, mode: ThemeMode) -> anyhow::Result<()> {
        *lock(&self.theme) = mode;
        self.preferences.save(THEME_KEY, mode.as_ref())
    }

    pub fn toggle_theme(&self) -> anyhow::Result<ThemeMode> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }
}

/// Marks the app busy for as long as it is alive
#[must_use = "the app is only busy while the guard is held"]
pub struct BusyGuard {
    state: Arc<AppState>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.state.busy.fetch_sub(1, Ordering::SeqCst);
    }
}

//! Persisted per-site and per-page ruler preferences.
//!
//! The store is a flat JSON object. Three boolean keys decide whether the
//! ruler is enabled for a page: the global `addonEnabled` flag, a flag keyed
//! by the page's host, and a flag keyed by the page's full URL. The ruler core
//! only ever sees the resulting [`PreferenceSnapshot`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::constants::DEFAULT_OPACITY;
use crate::error::PreferenceError;
use crate::visualizer::Appearance;

const KEY_ADDON_ENABLED: &str = "addonEnabled";
const KEY_APPEARANCE: &str = "appearance";
const KEY_COLOR_NAME: &str = "colorName";
const KEY_OPACITY: &str = "opacity";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub hex: &'static str,
}

/// Ruler colors offered by the control panel. The first entry is the default.
pub const COLORS: [NamedColor; 6] = [
    NamedColor {
        name: "yellow",
        hex: "#ffeb3b",
    },
    NamedColor {
        name: "green",
        hex: "#a5d6a7",
    },
    NamedColor {
        name: "blue",
        hex: "#90caf9",
    },
    NamedColor {
        name: "pink",
        hex: "#f48fb1",
    },
    NamedColor {
        name: "orange",
        hex: "#ffcc80",
    },
    NamedColor {
        name: "gray",
        hex: "#bdbdbd",
    },
];

/// Opacity steps offered by the control panel.
pub const OPACITY_STEPS: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];

pub fn color_by_name(name: &str) -> NamedColor {
    COLORS
        .iter()
        .copied()
        .find(|c| c.name == name)
        .unwrap_or(COLORS[0])
}

/// The subset of preferences the ruler consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceSnapshot {
    pub enabled: bool,
    pub appearance: String,
    pub color: String,
    pub opacity: f64,
}

impl Default for PreferenceSnapshot {
    fn default() -> Self {
        Self {
            enabled: true,
            appearance: Appearance::default().name().to_string(),
            color: COLORS[0].hex.to_string(),
            opacity: DEFAULT_OPACITY,
        }
    }
}

/// Flat key/value store persisted as a JSON object.
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, Value>,
}

impl PreferenceStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the store at `path`.
    ///
    /// A missing file yields an empty store. An unreadable or malformed file
    /// is reported and also yields an empty store; the broken file is left in
    /// place until the next successful `save`.
    pub fn load(path: &Path) -> Self {
        let mut store = Self {
            path: Some(path.to_path_buf()),
            values: BTreeMap::new(),
        };
        if !path.exists() {
            debug!("no preferences at {}; using defaults", path.display());
            return store;
        }
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, Value>>(&contents) {
                Ok(values) => store.values = values,
                Err(e) => warn!("Failed to parse preferences at {}: {e}", path.display()),
            },
            Err(e) => warn!("Failed to read preferences at {}: {e}", path.display()),
        }
        store
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reads a value, falling back when the key is absent or has the wrong type.
    pub fn read_value<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(fallback)
    }

    pub fn write_value<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn save(&self) -> Result<(), PreferenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source| PreferenceError::Io {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, json).map_err(io_err)
    }
}

/// Preferences resolved for one page URL.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePreferences {
    url: String,
    host: String,
    pub addon_enabled: bool,
    pub site_enabled: bool,
    pub page_enabled: bool,
    pub appearance: String,
    pub color_name: String,
    pub opacity: f64,
}

impl PagePreferences {
    pub fn read(store: &PreferenceStore, url: &str) -> Result<Self, PreferenceError> {
        let host = site_key(url)?;
        Ok(Self {
            addon_enabled: store.read_value(KEY_ADDON_ENABLED, true),
            site_enabled: store.read_value(&host, true),
            page_enabled: store.read_value(url, true),
            appearance: store.read_value(KEY_APPEARANCE, Appearance::default().name().to_string()),
            color_name: store.read_value(KEY_COLOR_NAME, COLORS[0].name.to_string()),
            opacity: store.read_value(KEY_OPACITY, DEFAULT_OPACITY),
            url: url.to_string(),
            host,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn enabled(&self) -> bool {
        self.addon_enabled && self.site_enabled && self.page_enabled
    }

    pub fn color(&self) -> NamedColor {
        color_by_name(&self.color_name)
    }

    pub fn snapshot(&self) -> PreferenceSnapshot {
        PreferenceSnapshot {
            enabled: self.enabled(),
            appearance: self.appearance.clone(),
            color: self.color().hex.to_string(),
            opacity: self.opacity,
        }
    }

    /// Stores every value and persists the store.
    pub fn write(&self, store: &mut PreferenceStore) -> Result<(), PreferenceError> {
        store.write_value(KEY_ADDON_ENABLED, self.addon_enabled)?;
        store.write_value(&self.host, self.site_enabled)?;
        store.write_value(&self.url, self.page_enabled)?;
        store.write_value(KEY_APPEARANCE, &self.appearance)?;
        store.write_value(KEY_COLOR_NAME, &self.color_name)?;
        store.write_value(KEY_OPACITY, self.opacity)?;
        store.save()
    }
}

/// Key for the per-site flag: the URL's host (with port), or its scheme when
/// the URL has no host (e.g. `file:` URLs).
pub fn site_key(url: &str) -> Result<String, PreferenceError> {
    let parsed = Url::parse(url).map_err(|source| PreferenceError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    Ok(match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) if !host.is_empty() => format!("{host}:{port}"),
        (Some(host), None) if !host.is_empty() => host.to_string(),
        _ => parsed.scheme().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_everything() {
        let store = PreferenceStore::in_memory();
        let prefs = PagePreferences::read(&store, "https://example.com/a").unwrap();
        assert!(prefs.enabled());
        let snap = prefs.snapshot();
        assert_eq!(snap, PreferenceSnapshot::default());
    }

    #[test]
    fn enabled_is_the_and_of_three_flags() {
        let mut store = PreferenceStore::in_memory();
        store.write_value("example.com", false).unwrap();
        let prefs = PagePreferences::read(&store, "https://example.com/a").unwrap();
        assert!(prefs.addon_enabled && prefs.page_enabled);
        assert!(!prefs.enabled());

        let other = PagePreferences::read(&store, "https://other.org/").unwrap();
        assert!(other.enabled());
    }

    #[test]
    fn wrong_typed_values_fall_back() {
        let mut store = PreferenceStore::in_memory();
        store.write_value(KEY_OPACITY, "very").unwrap();
        store.write_value(KEY_COLOR_NAME, "ultraviolet").unwrap();
        let prefs = PagePreferences::read(&store, "https://example.com/").unwrap();
        assert_eq!(prefs.opacity, DEFAULT_OPACITY);
        assert_eq!(prefs.snapshot().color, COLORS[0].hex);
    }

    #[test]
    fn site_keys() {
        assert_eq!(site_key("https://example.com/x?y").unwrap(), "example.com");
        assert_eq!(site_key("http://localhost:8080/").unwrap(), "localhost:8080");
        assert_eq!(site_key("file:///tmp/notes.md").unwrap(), "file");
        assert!(site_key("not a url").is_err());
    }
}

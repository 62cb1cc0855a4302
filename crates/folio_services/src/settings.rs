//! Settings management
//!
//! A JSON settings file with `window`, `background` and `contact` sections.
//! Every field has a default, so a missing file or a partial one is fine.
//! Contact relay credentials may also come from the environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_SERVICE_ID: &str = "FOLIO_EMAIL_SERVICE_ID";
pub const ENV_RECEIVER_TEMPLATE_ID: &str = "FOLIO_EMAIL_RECEIVER_TEMPLATE_ID";
pub const ENV_AUTO_REPLY_TEMPLATE_ID: &str = "FOLIO_EMAIL_AUTO_REPLY_TEMPLATE_ID";
pub const ENV_PUBLIC_KEY: &str = "FOLIO_EMAIL_PUBLIC_KEY";
pub const ENV_ENDPOINT: &str = "FOLIO_EMAIL_ENDPOINT";

pub const DEFAULT_EMAIL_ENDPOINT: &str = "https://api.emailjs.com";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub background: BackgroundSettings,
    pub contact: ContactSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub animate_title: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            width: 1280,
            height: 720,
            animate_title: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSettings {
    /// Seeds particle and floating-dot placement.
    pub particle_seed: u64,
    pub resize_debounce_ms: u64,
    /// Overrides the host's reduced-motion reading when set.
    pub reduced_motion: Option<bool>,
}

impl BackgroundSettings {
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            particle_seed: 42,
            resize_debounce_ms: 150,
            reduced_motion: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSettings {
    pub endpoint: String,
    pub service_id: Option<String>,
    pub receiver_template_id: Option<String>,
    pub auto_reply_template_id: Option<String>,
    pub public_key: Option<String>,
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_EMAIL_ENDPOINT.to_string(),
            service_id: None,
            receiver_template_id: None,
            auto_reply_template_id: None,
            public_key: None,
        }
    }
}

impl Settings {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from an optional file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut settings = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };
        settings.apply_env();
        Ok(settings)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply contact overrides from `lookup`. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let contact = &mut self.contact;
        if let Some(v) = get(ENV_SERVICE_ID) {
            contact.service_id = Some(v);
        }
        if let Some(v) = get(ENV_RECEIVER_TEMPLATE_ID) {
            contact.receiver_template_id = Some(v);
        }
        if let Some(v) = get(ENV_AUTO_REPLY_TEMPLATE_ID) {
            contact.auto_reply_template_id = Some(v);
        }
        if let Some(v) = get(ENV_PUBLIC_KEY) {
            contact.public_key = Some(v);
        }
        if let Some(v) = get(ENV_ENDPOINT) {
            contact.endpoint = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.background.resize_debounce(), Duration::from_millis(150));
        assert_eq!(settings.contact.endpoint, DEFAULT_EMAIL_ENDPOINT);
    }

    #[test]
    fn partial_file_merges_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("folio.json");
        fs::write(
            &path,
            r#"{ "background": { "particle_seed": 7 }, "contact": { "service_id": "svc" } }"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.background.particle_seed, 7);
        assert_eq!(settings.background.resize_debounce_ms, 150);
        assert_eq!(settings.contact.service_id.as_deref(), Some("svc"));
        assert_eq!(settings.window, WindowSettings::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("folio.json");
        fs::write(&path, "{ window: ").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn overrides_replace_contact_fields() {
        let env: HashMap<&str, &str> = [
            (ENV_SERVICE_ID, "service_env"),
            (ENV_PUBLIC_KEY, "key_env"),
            (ENV_RECEIVER_TEMPLATE_ID, "  "),
            (ENV_ENDPOINT, "http://localhost:9000"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.contact.receiver_template_id = Some("from_file".into());
        settings.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.contact.service_id.as_deref(), Some("service_env"));
        assert_eq!(settings.contact.public_key.as_deref(), Some("key_env"));
        assert_eq!(settings.contact.receiver_template_id.as_deref(), Some("from_file"));
        assert_eq!(settings.contact.endpoint, "http://localhost:9000");
        assert_eq!(settings.contact.auto_reply_template_id, None);
    }
}

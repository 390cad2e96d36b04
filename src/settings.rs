//! Application settings
//!
//! Settings are read from a YAML or TOML file with `common`, `server` and
//! `advanced` sections and kept in a process-wide snapshot. Readers take an
//! `Arc` of the current value, so a reload never blocks an in-flight request.

use std::path::Path;
use std::sync::{Arc, LazyLock, RwLock};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML settings: {0}")]
    Toml(#[from] toml::de::Error),
}

pub fn default_listen_address() -> String {
    "127.0.0.1".to_string()
}

pub fn default_listen_port() -> u16 {
    25500
}

pub fn default_max_concur_threads() -> usize {
    4
}

pub fn default_nodes_path() -> String {
    "nodes.json".to_string()
}

pub fn default_format() -> String {
    "clash".to_string()
}

pub fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct CommonSection {
    nodes_path: String,
    default_format: String,
    reload_nodes_on_request: bool,
}

impl Default for CommonSection {
    fn default() -> Self {
        Self {
            nodes_path: default_nodes_path(),
            default_format: default_format(),
            reload_nodes_on_request: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct ServerSection {
    listen: String,
    port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen_address(),
            port: default_listen_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct AdvancedSection {
    max_concur_threads: usize,
}

impl Default for AdvancedSection {
    fn default() -> Self {
        Self {
            max_concur_threads: default_max_concur_threads(),
        }
    }
}

/// On-disk layout shared by the YAML and TOML forms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct SettingsFile {
    common: CommonSection,
    server: ServerSection,
    advanced: AdvancedSection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Path the settings were loaded from, empty for defaults
    pub pref_path: String,
    pub listen_address: String,
    pub listen_port: u16,
    pub max_concur_threads: usize,
    /// JSON node file served by the HTTP layer
    pub nodes_path: String,
    /// Format used when the CLI is not given one
    pub default_format: String,
    pub reload_nodes_on_request: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from(SettingsFile::default())
    }
}

impl From<SettingsFile> for Settings {
    fn from(file: SettingsFile) -> Self {
        let listen_address = if file.server.listen.trim().is_empty() {
            default_listen_address()
        } else {
            file.server.listen
        };
        Settings {
            pref_path: String::new(),
            listen_address,
            listen_port: file.server.port,
            max_concur_threads: file.advanced.max_concur_threads.max(1),
            nodes_path: file.common.nodes_path,
            default_format: file.common.default_format,
            reload_nodes_on_request: file.common.reload_nodes_on_request,
        }
    }
}

impl Settings {
    /// Create a new settings instance with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the active settings
    pub fn current() -> Arc<Settings> {
        GLOBAL
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Parse settings, as YAML when a `common:` key is present and as TOML otherwise.
    pub fn load_from_content(content: &str) -> Result<Self, SettingsError> {
        let file: SettingsFile = if content.contains("common:") {
            serde_yaml::from_str(content)?
        } else {
            toml::from_str(content)?
        };
        Ok(Settings::from(file))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut settings = Settings::load_from_content(&content)?;
        settings.pref_path = path.display().to_string();
        Ok(settings)
    }
}

static GLOBAL: LazyLock<RwLock<Arc<Settings>>> =
    LazyLock::new(|| RwLock::new(Arc::new(Settings::new())));

fn replace_global(settings: Settings) {
    *GLOBAL
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(settings);
}

/// Load settings from `path` and make them the active snapshot.
pub fn init_settings<P: AsRef<Path>>(path: P) -> Result<(), SettingsError> {
    let settings = Settings::load_from_file(path.as_ref())?;
    info!("Loaded settings from '{}'", settings.pref_path);
    replace_global(settings);
    Ok(())
}

/// Replace the active snapshot with settings parsed from `content`.
///
/// The previous snapshot stays active when parsing fails.
pub fn update_settings_from_content(content: &str) -> Result<(), SettingsError> {
    let settings = Settings::load_from_content(content)?;
    replace_global(settings);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::new();
        assert_eq!(settings.listen_address, "127.0.0.1");
        assert_eq!(settings.listen_port, 25500);
        assert_eq!(settings.max_concur_threads, 4);
        assert_eq!(settings.nodes_path, "nodes.json");
        assert_eq!(settings.default_format, "clash");
        assert!(settings.reload_nodes_on_request);
    }

    #[test]
    fn test_yaml_content() {
        let settings = Settings::load_from_content(
            "common:\n  nodes_path: /srv/nodes.json\n  default_format: surge\nserver:\n  port: 8080\n",
        )
        .unwrap();
        assert_eq!(settings.nodes_path, "/srv/nodes.json");
        assert_eq!(settings.default_format, "surge");
        assert_eq!(settings.listen_port, 8080);
        assert_eq!(settings.listen_address, "127.0.0.1");
    }

    #[test]
    fn test_toml_content() {
        let settings = Settings::load_from_content(
            "[server]\nlisten = \"0.0.0.0\"\n\n[advanced]\nmax_concur_threads = 0\n",
        )
        .unwrap();
        assert_eq!(settings.listen_address, "0.0.0.0");
        assert_eq!(settings.max_concur_threads, 1);
        assert_eq!(settings.default_format, "clash");
    }

    #[test]
    fn test_invalid_content() {
        assert!(matches!(
            Settings::load_from_content("[server\nport = 1"),
            Err(SettingsError::Toml(_))
        ));
    }
}

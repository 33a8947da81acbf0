use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::version::checker::UnknownPackagePolicy;
use crate::version::registries::npm::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

// =============================================================================
// Channel names
// =============================================================================

/// Channel carrying package names to check
pub const DEFAULT_CHECK_CHANNEL: &str = "module.check";

/// Channel carrying update announcements
pub const DEFAULT_UPDATE_CHANNEL: &str = "module.update";

/// File name of the module registry snapshot inside the data directory
pub const MODULE_REGISTRY_FILE: &str = "module-registry.json";

/// Notifier configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NotifierConfig {
    pub registry: RegistryConfig,
    pub cache: CacheConfig,
    pub channels: ChannelsConfig,
    pub notifier: NotifyConfig,
}

/// Package registry configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    pub url: String,
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Module registry snapshot configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Snapshot location, defaults to [`module_registry_path`]
    pub snapshot_path: Option<PathBuf>,
    /// Compare later checks against versions already announced by this process
    pub remember_notified: bool,
}

impl CacheConfig {
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(module_registry_path)
    }
}

/// Pub/sub channel names
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChannelsConfig {
    pub check: String,
    pub update: String,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            check: DEFAULT_CHECK_CHANNEL.to_string(),
            update: DEFAULT_UPDATE_CHANNEL.to_string(),
        }
    }
}

/// Shape of the update announcement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// `{"name": "...", "version": "..."}`
    #[default]
    Versioned,
    /// Bare version string
    Legacy,
}

/// Check-and-notify behaviour
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NotifyConfig {
    pub unknown_packages: UnknownPackagePolicy,
    pub payload: PayloadFormat,
    /// Skip a check while another check of the same package is in flight
    pub single_flight: bool,
}

impl NotifierConfig {
    /// Read configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config file {:?}", path))
    }
}

/// Returns the path to the data directory for update-notifier.
/// Uses $XDG_DATA_HOME/update-notifier if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/update-notifier,
/// or ./update-notifier if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the module registry snapshot.
pub fn module_registry_path() -> PathBuf {
    data_dir().join(MODULE_REGISTRY_FILE)
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("update-notifier.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("update-notifier")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn notifier_config_from_partial_object_uses_defaults_for_missing_fields() {
        let result = serde_json::from_value::<NotifierConfig>(json!({
            "channels": {
                "check": "packages.check"
            }
        }))
        .unwrap();

        assert_eq!(result.channels.check, "packages.check");
        assert_eq!(result.channels.update, DEFAULT_UPDATE_CHANNEL);
        assert_eq!(result.registry, RegistryConfig::default());
        assert_eq!(result.notifier, NotifyConfig::default());
    }

    #[test]
    fn notifier_config_from_full_object_parses_all_fields() {
        let result = serde_json::from_value::<NotifierConfig>(json!({
            "registry": {
                "url": "http://registry.npmjs.org",
                "userAgent": "watcher"
            },
            "cache": {
                "snapshotPath": "/srv/module-registry.json",
                "rememberNotified": true
            },
            "channels": {
                "check": "a",
                "update": "b"
            },
            "notifier": {
                "unknownPackages": "suppress",
                "payload": "legacy",
                "singleFlight": true
            }
        }))
        .unwrap();

        assert_eq!(
            result,
            NotifierConfig {
                registry: RegistryConfig {
                    url: "http://registry.npmjs.org".to_string(),
                    user_agent: "watcher".to_string(),
                },
                cache: CacheConfig {
                    snapshot_path: Some(PathBuf::from("/srv/module-registry.json")),
                    remember_notified: true,
                },
                channels: ChannelsConfig {
                    check: "a".to_string(),
                    update: "b".to_string(),
                },
                notifier: NotifyConfig {
                    unknown_packages: UnknownPackagePolicy::Suppress,
                    payload: PayloadFormat::Legacy,
                    single_flight: true,
                },
            }
        );
    }

    #[test]
    fn from_file_reads_json_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"notifier": {{"payload": "legacy"}}}}"#).unwrap();

        let config = NotifierConfig::from_file(file.path()).unwrap();

        assert_eq!(config.notifier.payload, PayloadFormat::Legacy);
    }

    #[test]
    fn from_file_rejects_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "registry = 1").unwrap();

        assert!(NotifierConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn snapshot_path_prefers_configured_path() {
        let cache = CacheConfig {
            snapshot_path: Some(PathBuf::from("/tmp/registry.json")),
            remember_notified: false,
        };

        assert_eq!(cache.snapshot_path(), PathBuf::from("/tmp/registry.json"));
    }

    #[test]
    fn data_dir_with_env_uses_xdg_data_home_when_set() {
        let path = data_dir_with_env(
            Some("/tmp/test-data".to_string()),
            Some(PathBuf::from("/home/user")),
        );

        assert_eq!(path, PathBuf::from("/tmp/test-data/update-notifier"));
    }

    #[test]
    fn data_dir_with_env_falls_back_to_home_local_share() {
        let path = data_dir_with_env(None, Some(PathBuf::from("/home/user")));

        assert_eq!(
            path,
            PathBuf::from("/home/user/.local/share/update-notifier")
        );
    }

    #[test]
    fn data_dir_with_env_falls_back_to_current_dir_when_no_dirs_available() {
        let path = data_dir_with_env(None, None);
        assert_eq!(path, PathBuf::from("./update-notifier"));
    }
}

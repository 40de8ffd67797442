use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::paths::config_path;

/// Stored configuration values. Unset fields are omitted from the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<String>,
}

impl Config {
    /// Empty and whitespace-only strings collapse to `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            api_key: normalize(self.api_key),
            base_url: normalize(self.base_url),
            default_model: normalize(self.default_model),
            default_mode: normalize(self.default_mode),
        }
    }

    /// Overlay `patch` on top of `self`; `None` fields keep existing values.
    #[must_use]
    pub fn merged_with(self, patch: Config) -> Self {
        let patch = patch.normalized();
        Self {
            api_key: patch.api_key.or(self.api_key),
            base_url: patch.base_url.or(self.base_url),
            default_model: patch.default_model.or(self.default_model),
            default_mode: patch.default_mode.or(self.default_mode),
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Load the config from the default path. Never fails; see
/// [`load_config_from`] for the degradation rules.
#[must_use]
pub fn load_config() -> Config {
    load_config_from(&config_path())
}

/// Load a config file.
///
/// - missing file: defaults
/// - malformed TOML: quarantine the file as `.bad-<epoch-secs>` (best
///   effort) and return defaults
/// - I/O error: defaults
#[must_use]
pub fn load_config_from(path: &Path) -> Config {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => return Config::default(),
    };

    match toml::from_str::<Config>(&text) {
        Ok(config) => config.normalized(),
        Err(error) => {
            warn!(path = %path.display(), %error, "malformed config file, quarantining");
            quarantine_malformed(path);
            Config::default()
        }
    }
}

/// Preserve a broken config file for debugging, then continue with defaults.
fn quarantine_malformed(path: &Path) {
    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let mut quarantined = path.as_os_str().to_owned();
    quarantined.push(format!(".bad-{epoch}"));
    let _ = fs::rename(path, PathBuf::from(quarantined));
}

/// Persist the config to the default path. Returns the written path.
pub fn save_config(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, config)?;
    Ok(path)
}

/// Persist the config atomically with correct TOML quoting.
///
/// Creates the parent directory, writes via a sibling temp file + rename so
/// the target is never partially written, and applies best-effort `0700`
/// dir / `0600` file permissions on Unix.
pub fn save_config_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|source| ConfigError::io("creating directory", dir, source))?;
    restrict_permissions(dir, 0o700);

    let text = toml::to_string(&config.clone().normalized()).map_err(|source| {
        ConfigError::Serialize {
            path: path.to_path_buf(),
            source,
        }
    })?;

    atomic_write(path, &text)?;
    restrict_permissions(path, 0o600);
    Ok(())
}

/// Temp file beside the destination keeps the rename atomic on one filesystem.
fn atomic_write(path: &Path, data: &str) -> Result<(), ConfigError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    let result = (|| {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(data.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if let Err(source) = result {
        let _ = fs::remove_file(&tmp);
        return Err(ConfigError::io("writing config", path, source));
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode));
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) {}

/// Merge the provided fields into the existing config and save.
/// `None` fields are ignored; empty strings are normalized to unset.
pub fn update_config(patch: Config) -> Result<PathBuf, ConfigError> {
    let merged = load_config().merged_with(patch);
    save_config(&merged)
}

/// Resolve the API key, preferring the config file then `OPENAI_API_KEY`.
#[must_use]
pub fn resolve_api_key() -> Option<String> {
    if let Some(key) = load_config().api_key {
        return Some(key);
    }
    std::env::var("OPENAI_API_KEY")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Resolve the base URL from the config file only (no env fallback).
#[must_use]
pub fn resolve_base_url() -> Option<String> {
    load_config().base_url
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{load_config_from, save_config_to, Config};

    fn sample() -> Config {
        Config {
            api_key: Some("abc-def".to_string()),
            base_url: Some("https://example.com/v1".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("config.toml");

        save_config_to(&path, &sample()).unwrap();
        assert!(path.exists());
        assert_eq!(load_config_from(&path), sample());
    }

    #[test]
    fn unset_fields_are_omitted_from_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config {
            api_key: Some("sk-abc".to_string()),
            ..Config::default()
        };
        save_config_to(&path, &config).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("api_key = \"sk-abc\""));
        assert!(!text.contains("base_url"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml"));
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn malformed_file_is_quarantined_and_defaults_returned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = not quoted toml").unwrap();

        assert_eq!(load_config_from(&path), Config::default());
        assert!(!path.exists());

        let quarantined = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .any(|entry| entry.file_name().to_string_lossy().contains(".bad-"));
        assert!(quarantined, "broken file should be preserved for debugging");
    }

    #[test]
    fn empty_strings_normalize_to_none() {
        let config = Config {
            api_key: Some("  ".to_string()),
            base_url: Some(String::new()),
            default_model: Some("gpt-4o-mini".to_string()),
            default_mode: None,
        }
        .normalized();

        assert_eq!(config.api_key, None);
        assert_eq!(config.base_url, None);
        assert_eq!(config.default_model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn merge_keeps_existing_values_for_unset_fields() {
        let merged = sample().merged_with(Config {
            default_model: Some("gpt-4o".to_string()),
            api_key: Some(String::new()),
            ..Config::default()
        });

        assert_eq!(merged.api_key.as_deref(), Some("abc-def"));
        assert_eq!(merged.default_model.as_deref(), Some("gpt-4o"));
        assert_eq!(merged.base_url.as_deref(), Some("https://example.com/v1"));
    }

    #[test]
    #[cfg(unix)]
    fn permissions_are_restricted_best_effort_on_unix() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("config.toml");
        save_config_to(&path, &sample()).unwrap();

        let dir_mode = fs::metadata(path.parent().unwrap()).unwrap().permissions().mode();
        let file_mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
        assert_eq!(file_mode & 0o777, 0o600);
    }

    #[test]
    fn overwrite_replaces_previous_contents_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        save_config_to(&path, &sample()).unwrap();
        let updated = Config {
            api_key: Some("sk-new".to_string()),
            ..Config::default()
        };
        save_config_to(&path, &updated).unwrap();

        let loaded = load_config_from(&path);
        assert_eq!(loaded.api_key.as_deref(), Some("sk-new"));
        assert_eq!(loaded.base_url, None);

        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }
}

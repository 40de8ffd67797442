use std::env;
use std::path::PathBuf;

pub const APP_NAME: &str = "cgpt";
pub const CONFIG_FILE: &str = "config.toml";

fn env_dir(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// `$XDG_CONFIG_HOME`, falling back to `~/.config`.
fn unix_config_home() -> PathBuf {
    env_dir("XDG_CONFIG_HOME").unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
    })
}

/// `%APPDATA%`, falling back to `~/AppData/Roaming`.
fn windows_config_home() -> PathBuf {
    env_dir("APPDATA").unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("AppData")
            .join("Roaming")
    })
}

/// Platform-specific directory holding the cgpt config file.
#[must_use]
pub fn config_dir() -> PathBuf {
    let home = if cfg!(windows) {
        windows_config_home()
    } else {
        unix_config_home()
    };
    home.join(APP_NAME)
}

/// Full path to `config.toml`.
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::{config_dir, config_path, CONFIG_FILE};
    use serial_test::serial;

    #[test]
    #[serial]
    #[cfg(not(windows))]
    fn config_dir_respects_xdg_config_home() {
        let tmp = tempfile::tempdir().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", tmp.path());

        assert_eq!(config_dir(), tmp.path().join("cgpt"));
        assert_eq!(config_path(), tmp.path().join("cgpt").join(CONFIG_FILE));

        std::env::remove_var("XDG_CONFIG_HOME");
    }

    #[test]
    #[serial]
    #[cfg(not(windows))]
    fn empty_xdg_override_falls_back_to_home() {
        std::env::set_var("XDG_CONFIG_HOME", "");
        let dir = config_dir();
        assert!(dir.ends_with("cgpt"));
        std::env::remove_var("XDG_CONFIG_HOME");
    }
}

//! Configuration loading and store-path resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Database path resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
///
/// Hosts that manage their own storage can skip this entirely and hand the
/// engine a pool they opened themselves.
pub fn resolve_db_path(
    cli_arg: Option<&str>,
    env_var_name: &str,
    config_file_key: Option<&str>,
) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Some(key) = config_file_key {
        if let Ok(config_path) = load_config_file() {
            if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
                if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                    if let Some(db_path) = config.get(key).and_then(|v| v.as_str()) {
                        return Ok(PathBuf::from(db_path));
                    }
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_db_path())
}

/// Get default configuration file path for the platform
fn load_config_file() -> Result<PathBuf> {
    let config_path = if cfg!(target_os = "linux") {
        // Try ~/.config/quotamatch/config.toml first, then /etc/quotamatch/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("quotamatch").join("config.toml"));
        let system_config = PathBuf::from("/etc/quotamatch/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    } else if cfg!(target_os = "macos") || cfg!(target_os = "windows") {
        dirs::config_dir()
            .map(|d| d.join("quotamatch").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?
    } else {
        return Err(Error::Config("Unsupported platform".to_string()));
    };

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// Get OS-dependent default database path
fn default_db_path() -> PathBuf {
    let data_dir = if cfg!(target_os = "linux") {
        // ~/.local/share/quotamatch
        dirs::data_local_dir()
            .map(|d| d.join("quotamatch"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/quotamatch"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/quotamatch
        dirs::data_dir()
            .map(|d| d.join("quotamatch"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/quotamatch"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\quotamatch
        dirs::data_local_dir()
            .map(|d| d.join("quotamatch"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\quotamatch"))
    } else {
        PathBuf::from("./quotamatch_data")
    };
    data_dir.join("quotamatch.db")
}

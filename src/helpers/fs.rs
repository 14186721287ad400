//! File System Utilities
//!
//! Configuration directory management and config file loading.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use home::home_dir;

use crate::constants::CONFIG_FILE_NAME;
use crate::domain::config::AppConfig;
use crate::error::{Error, Result};

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "clinic", "clinic-booking")
        .ok_or_else(|| Error::invalid("Could not determine project directories"))
}

/// Get or create the application's configuration directory
///
/// Platform-specific locations:
/// - **Linux**: `~/.config/clinic-booking/` or `$XDG_CONFIG_HOME/clinic-booking/`
/// - **macOS**: `~/Library/Application Support/com.clinic.clinic-booking/`
/// - **Windows**: `C:\Users\<User>\AppData\Roaming\clinic\clinic-booking\config\`
pub fn get_or_create_config_dir() -> Result<PathBuf> {
    let project_dirs = project_dirs()?;
    let config_dir = project_dirs.config_dir();

    if !config_dir.exists() {
        fs::create_dir_all(config_dir)?;
    }

    // Handle migration from old location if needed
    if let Some(home) = home_dir() {
        let old_config_path = home.join(".clinic-booking");
        if old_config_path.exists() {
            match copy_dir_files(&old_config_path, config_dir) {
                Ok(()) => {
                    let _ = fs::remove_dir_all(&old_config_path);
                    tracing::info!(from = ?old_config_path, to = ?config_dir, "Migrated legacy config directory");
                }
                Err(e) => tracing::warn!(error = %e, "Legacy config migration failed"),
            }
        }
    }

    Ok(config_dir.to_path_buf())
}

/// Copy files (not directories) from source to destination
fn copy_dir_files(src: &Path, dst: &Path) -> Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        fs::copy(entry.path(), dst.join(entry.file_name()))?;
    }
    Ok(())
}

/// Get the data directory (log files live here)
///
/// Platform-specific locations:
/// - **Linux**: `~/.local/share/clinic-booking/`
/// - **macOS**: `~/Library/Application Support/com.clinic.clinic-booking/`
/// - **Windows**: `C:\Users\<User>\AppData\Roaming\clinic\clinic-booking\data\`
pub fn get_or_create_data_dir() -> Result<PathBuf> {
    let project_dirs = project_dirs()?;
    let data_dir = project_dirs.data_dir();

    if !data_dir.exists() {
        fs::create_dir_all(data_dir)?;
    }

    Ok(data_dir.to_path_buf())
}

/// Check if running in development mode
pub fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Load config from `path`; a missing or empty file yields defaults
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::debug!(path = ?path, "No config file, using defaults");
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    toml::from_str(&content).map_err(|e| {
        tracing::error!(path = ?path, error = %e, "Failed to parse config file");
        Error::from(e)
    })
}

/// Load `clinic-booking.toml` from the config directory
///
/// On first run the defaults are written out so they can be edited.
pub fn load_config() -> Result<AppConfig> {
    let path = get_or_create_config_dir()?.join(CONFIG_FILE_NAME);
    let config = load_config_from(&path)?;
    if !path.exists()
        && let Err(e) = save_config_to(&path, &config)
    {
        tracing::warn!(path = ?path, error = %e, "Could not write default config");
    }
    Ok(config)
}

/// Write config as TOML to `path`
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::Backend;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("clinic-booking-{}-{name}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_config_from(&temp_path("missing.toml")).expect("defaults");
        assert_eq!(config.api.backend, Backend::Mock);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("config.toml");
        let mut config = AppConfig::default();
        config.locale = Some("ru".into());
        config.slots.availability_ratio = 1.0;
        save_config_to(&path, &config).expect("save");

        let loaded = load_config_from(&path).expect("load");
        assert_eq!(loaded.locale.as_deref(), Some("ru"));
        assert_eq!(loaded.slots.availability_ratio, 1.0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let path = temp_path("broken.toml");
        fs::write(&path, "[api\nbackend = ").expect("write");
        assert!(matches!(load_config_from(&path), Err(Error::TomlDe { .. })));
        let _ = fs::remove_file(&path);
    }
}

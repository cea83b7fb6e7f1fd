//! Settings file reading.

use std::path::Path;

use super::{
    ConfigError,
    Settings,
};

/// Default settings file name.
pub const SETTINGS_FILE_NAME: &str = "i18n.json";

/// Loads the settings file of a directory.
///
/// # Returns
/// - `Ok(Some(settings))`: the file exists and parses
/// - `Ok(None)`: there is no settings file
/// - `Err(ConfigError)`: read or parse error
///
/// # Errors
/// - File read error
/// - JSON parse error
pub(super) fn load_from_dir(dir: &Path) -> Result<Option<Settings>, ConfigError> {
    let config_path = dir.join(SETTINGS_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    read_settings(&config_path).map(Some)
}

/// Reads and validates a settings file.
///
/// A directory is searched for [`SETTINGS_FILE_NAME`].
///
/// # Errors
/// - File read error
/// - JSON parse error
/// - Validation errors
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let config_path =
        if path.is_dir() { path.join(SETTINGS_FILE_NAME) } else { path.to_path_buf() };

    let settings = read_settings(&config_path)?;
    settings.validate().map_err(ConfigError::ValidationErrors)?;

    Ok(settings)
}

/// Reads and parses `path` without validating.
fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
    tracing::debug!("Loading configuration from: {:?}", path);

    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;

    Ok(settings)
}

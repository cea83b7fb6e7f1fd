//! Settings management.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use super::{
    Config,
    ConfigError,
    Settings,
    loader,
};
use crate::parser::Parser;

/// Holds the current settings and the directory their files are relative to.
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// Current settings
    current_settings: Settings,

    /// Directory the settings were loaded from
    base_dir: Option<PathBuf>,
}

impl ConfigManager {
    /// Creates a manager with default settings
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: Settings::default(), base_dir: None }
    }

    /// Loads the settings file of `base_dir`
    ///
    /// A directory without a settings file yields default settings.
    ///
    /// # Errors
    /// - File read error
    /// - JSON parse error
    /// - Validation errors
    pub fn load_settings(&mut self, base_dir: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for directory: {:?}", base_dir);

        let settings = if let Some(dir) = &base_dir {
            loader::load_from_dir(dir)?.map_or_else(Settings::default, |settings| {
                tracing::debug!("Loaded settings: {:?}", settings);
                settings
            })
        } else {
            Settings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.base_dir = base_dir;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// Loads a settings file, or the settings file of a directory
    ///
    /// Unlike [`ConfigManager::load_settings`], a missing file is an error.
    /// The base directory becomes `path` itself when it is a directory,
    /// otherwise the directory containing the file.
    ///
    /// # Errors
    /// - File read error
    /// - JSON parse error
    /// - Validation errors
    pub fn load_settings_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let settings = loader::load_settings(path)?;

        let base_dir = if path.is_dir() {
            path.to_path_buf()
        } else {
            path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        };

        self.current_settings = settings;
        self.base_dir = Some(base_dir);
        tracing::debug!("Settings loaded from {:?}", path);

        Ok(())
    }

    /// Replaces the settings after validating them
    ///
    /// # Errors
    /// - Validation errors
    pub fn update_settings(&mut self, new_settings: Settings) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings...");

        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!("Settings updated successfully");

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &Settings {
        &self.current_settings
    }

    #[must_use]
    pub const fn base_dir(&self) -> Option<&PathBuf> {
        self.base_dir.as_ref()
    }

    /// Builds the runtime configuration from the current settings
    ///
    /// Loader files resolve against the base directory, or the working
    /// directory when none is set.
    #[must_use]
    pub fn build_config(&self, parser: Arc<dyn Parser>) -> Config {
        let base_dir = self.base_dir.as_deref().unwrap_or_else(|| Path::new("."));
        self.current_settings.clone().into_config(base_dir, parser)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::config::SETTINGS_FILE_NAME;
    use crate::parser::BasicParser;

    /// new: default settings
    #[rstest]
    fn test_new_creates_default_settings() {
        let manager = ConfigManager::new();

        assert!(manager.get_settings().loaders.is_empty());
        assert!(manager.base_dir().is_none());
    }

    /// load_settings: no directory
    #[rstest]
    fn test_load_settings_without_directory() {
        let mut manager = ConfigManager::new();

        let result = manager.load_settings(None);

        assert!(result.is_ok());
        assert!(manager.get_settings().init_locale.is_none());
        assert!(manager.base_dir().is_none());
    }

    /// load_settings: settings file present
    #[rstest]
    #[allow(clippy::unwrap_used)]
    fn test_load_settings_with_config_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(SETTINGS_FILE_NAME), r#"{"initLocale": "de"}"#).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(result.is_ok());
        assert_eq!(manager.get_settings().init_locale.as_deref(), Some("de"));
        assert!(manager.base_dir().is_some());
    }

    /// load_settings: invalid file keeps the previous settings
    #[rstest]
    #[allow(clippy::unwrap_used)]
    fn test_load_settings_invalid_keeps_previous() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(SETTINGS_FILE_NAME), r#"{"cache": 0}"#).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(matches!(result, Err(ConfigError::ValidationErrors(_))));
        assert!(manager.get_settings().cache.is_none());
        assert!(manager.base_dir().is_none());
    }

    /// load_settings_file: a file path uses its parent as base directory
    #[rstest]
    #[allow(clippy::unwrap_used)]
    fn test_load_settings_file_uses_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.json");
        fs::write(&path, r#"{"initLocale": "fr"}"#).unwrap();

        let mut manager = ConfigManager::new();
        manager.load_settings_file(&path).unwrap();

        assert_eq!(manager.get_settings().init_locale.as_deref(), Some("fr"));
        assert_eq!(manager.base_dir(), Some(&temp_dir.path().to_path_buf()));
    }

    /// load_settings_file: a directory is searched for the settings file
    #[rstest]
    #[allow(clippy::unwrap_used)]
    fn test_load_settings_file_accepts_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(SETTINGS_FILE_NAME), r#"{"initLocale": "fr"}"#).unwrap();

        let mut manager = ConfigManager::new();
        manager.load_settings_file(temp_dir.path()).unwrap();

        assert_eq!(manager.base_dir(), Some(&temp_dir.path().to_path_buf()));
    }

    /// load_settings_file: a missing file is an error
    #[rstest]
    #[allow(clippy::unwrap_used)]
    fn test_load_settings_file_missing_is_error() {
        let temp_dir = TempDir::new().unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings_file(&temp_dir.path().join("missing.json"));

        assert!(matches!(result, Err(ConfigError::IoError(_))));
        assert!(manager.base_dir().is_none());
    }

    /// update_settings: valid settings replace the current ones
    #[rstest]
    fn test_update_settings_valid() {
        let mut manager = ConfigManager::new();
        let new_settings = Settings { fallback_locale: Some("en".to_string()), ..Settings::default() };

        let result = manager.update_settings(new_settings);

        assert!(result.is_ok());
        assert_eq!(manager.get_settings().fallback_locale.as_deref(), Some("en"));
    }

    /// update_settings: invalid settings are rejected
    #[rstest]
    fn test_update_settings_invalid() {
        let mut manager = ConfigManager::new();
        let new_settings = Settings { cache: Some(0), ..Settings::default() };

        let result = manager.update_settings(new_settings);

        assert!(result.is_err());
    }

    /// build_config: loader files resolve against the base directory
    #[tokio::test]
    #[allow(clippy::unwrap_used)]
    async fn test_build_config_reads_relative_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("en")).unwrap();
        fs::write(temp_dir.path().join("en").join("common.json"), r#"{"ok": "OK"}"#).unwrap();
        fs::write(
            temp_dir.path().join(SETTINGS_FILE_NAME),
            r#"{"loaders": [{"key": "common", "locale": "en", "file": "en/common.json"}]}"#,
        )
        .unwrap();

        let mut manager = ConfigManager::new();
        manager.load_settings(Some(temp_dir.path().to_path_buf())).unwrap();
        let config = manager.build_config(Arc::new(BasicParser));

        let payload = config.loaders.first().unwrap().loader.load().await.unwrap();
        assert_eq!(payload.get("ok").and_then(crate::node::Node::as_str), Some("OK"));
    }
}

//! Settings file schema and validation.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;
use std::time::Duration;

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};
use thiserror::Error;

use super::runtime::{
    Config,
    DEFAULT_CACHE,
};
use crate::flatten::{
    KEY_SEPARATOR,
    Preprocess,
};
use crate::loader::{
    Loader,
    LoaderDescriptor,
    RoutePattern,
};
use crate::locale::LocaleTag;
use crate::logger::{
    DEFAULT_PREFIX,
    LogLevel,
    LogSettings,
};
use crate::node::{
    ObjectMap,
    normalize_translations,
};
use crate::parser::Parser;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "loaders[0].key")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Numbered, one-per-line rendering of validation errors.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Preprocessing selectable from a settings file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PreprocessMode {
    #[default]
    Full,
    PreserveArrays,
    None,
}

impl From<PreprocessMode> for Preprocess {
    fn from(mode: PreprocessMode) -> Self {
        match mode {
            PreprocessMode::Full => Self::Full,
            PreprocessMode::PreserveArrays => Self::PreserveArrays,
            PreprocessMode::None => Self::None,
        }
    }
}

/// A route entry: a literal route, `{ "regex": ... }` or `{ "glob": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RouteSetting {
    Literal(String),
    Regex { regex: String },
    Glob { glob: String },
}

impl RouteSetting {
    /// Compiles the entry. Malformed patterns become
    /// [`RoutePattern::Invalid`].
    #[must_use]
    pub fn to_pattern(&self) -> RoutePattern {
        match self {
            Self::Literal(route) => RoutePattern::literal(route.clone()),
            Self::Regex { regex } => RoutePattern::regex(regex),
            Self::Glob { glob } => RoutePattern::glob(glob),
        }
    }
}

/// A file-backed loader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderSettings {
    /// Namespace key
    pub key: String,
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<RouteSetting>>,
    /// JSON file, relative to the settings file's directory.
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub init_locale: Option<String>,
    pub fallback_locale: Option<String>,

    /// Value returned for keys missing everywhere.
    ///
    /// - absent: not configured, the parser decides
    /// - `null`: configured, resolves to an empty string
    /// - `"text"`: configured, resolves to `text`
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub fallback_value: Option<Option<String>>,

    pub preprocess: PreprocessMode,

    /// Cache window in milliseconds. Default: one day.
    pub cache: Option<u64>,

    pub log: Option<LogConfig>,

    /// Static translations keyed by locale.
    pub translations: ObjectMap,

    pub loaders: Vec<LoaderSettings>,
}

/// Marks a present field as configured, `null` included.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl Settings {
    /// # Errors
    /// - Required field is empty
    /// - Loader key contains the key separator
    /// - Invalid regex or glob route
    /// - Zero cache window
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(locale) = &self.init_locale
            && locale.trim().is_empty()
        {
            errors.push(ValidationError::new(
                "initLocale",
                "The locale cannot be empty. Please specify a locale (e.g., \"en\"), or remove this field",
            ));
        }

        if let Some(locale) = &self.fallback_locale
            && locale.trim().is_empty()
        {
            errors.push(ValidationError::new(
                "fallbackLocale",
                "The locale cannot be empty. Please specify a locale (e.g., \"en\"), or remove this field",
            ));
        }

        if self.cache == Some(0) {
            errors.push(ValidationError::new(
                "cache",
                "The cache window must be greater than 0 milliseconds",
            ));
        }

        for (index, loader) in self.loaders.iter().enumerate() {
            validate_loader(index, loader, &mut errors);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Builds the runtime configuration.
    ///
    /// Loader files are resolved against `base_dir` and read when the loader
    /// runs, not here.
    #[must_use]
    pub fn into_config(self, base_dir: &Path, parser: Arc<dyn Parser>) -> Config {
        let loaders = self
            .loaders
            .into_iter()
            .map(|loader| {
                let descriptor = LoaderDescriptor::new(
                    loader.key,
                    &loader.locale,
                    Loader::from_file(base_dir.join(&loader.file)),
                );
                match loader.routes {
                    Some(routes) => descriptor.with_routes(routes.iter().map(RouteSetting::to_pattern)),
                    None => descriptor,
                }
            })
            .collect();

        Config {
            loaders,
            translations: normalize_translations(self.translations),
            init_locale: self.init_locale.as_deref().and_then(LocaleTag::parse),
            fallback_locale: self.fallback_locale.as_deref().and_then(LocaleTag::parse),
            fallback_value: self.fallback_value,
            preprocess: self.preprocess.into(),
            cache: self.cache.map_or(DEFAULT_CACHE, Duration::from_millis),
            log: self.log.map(|log| LogSettings {
                level: log.level,
                prefix: log.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
                sink: None,
            }),
            parser,
        }
    }
}

/// Validates `loaders[index]`.
fn validate_loader(index: usize, loader: &LoaderSettings, errors: &mut Vec<ValidationError>) {
    if loader.key.is_empty() {
        errors.push(ValidationError::new(
            format!("loaders[{index}].key"),
            "The key cannot be empty. Example: \"common\"",
        ));
    } else if loader.key.contains(KEY_SEPARATOR) {
        errors.push(ValidationError::new(
            format!("loaders[{index}].key"),
            format!("The key '{}' cannot contain '{KEY_SEPARATOR}'", loader.key),
        ));
    }

    if loader.locale.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("loaders[{index}].locale"),
            "The locale cannot be empty. Example: \"en\"",
        ));
    }

    if loader.file.as_os_str().is_empty() {
        errors.push(ValidationError::new(
            format!("loaders[{index}].file"),
            "The file cannot be empty. Example: \"locales/en/common.json\"",
        ));
    }

    for (route_index, route) in loader.routes.iter().flatten().enumerate() {
        let field_path = format!("loaders[{index}].routes[{route_index}]");
        match route {
            RouteSetting::Literal(_) => {}
            RouteSetting::Regex { regex } => {
                if let Err(e) = regex::Regex::new(regex) {
                    errors.push(ValidationError::new(
                        field_path,
                        format!("Invalid regex pattern '{regex}': {e}"),
                    ));
                }
            }
            RouteSetting::Glob { glob } => {
                if let Err(e) = globset::Glob::new(glob) {
                    errors.push(ValidationError::new(
                        field_path,
                        format!("Invalid glob pattern '{glob}': {e}"),
                    ));
                }
            }
        }
    }
}

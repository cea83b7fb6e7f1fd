//! Configuration: the runtime [`Config`] and the JSON settings file that
//! builds one.
mod loader;
mod manager;
mod runtime;
mod types;

pub use loader::{
    SETTINGS_FILE_NAME,
    load_settings,
};
pub use manager::ConfigManager;
pub use runtime::{
    Config,
    DEFAULT_CACHE,
};
pub use types::{
    ConfigError,
    LoaderSettings,
    LogConfig,
    PreprocessMode,
    RouteSetting,
    Settings,
    ValidationError,
};

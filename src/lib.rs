//! routed-i18n
//!
//! Route-aware i18n state manager: lazily loads translations per locale,
//! namespace and route, keeps them in dot-notation tables and resolves keys
//! with fallback locale and fallback value.

pub mod config;
pub mod flatten;
pub mod i18n;
pub mod loader;
pub mod locale;
pub mod logger;
pub mod node;
pub mod parser;
pub mod store;
pub mod translate;

mod test_utils;

pub use config::Config;
pub use i18n::{
    I18n,
    TranslationProps,
};
pub use loader::{
    Loader,
    LoaderDescriptor,
    LoaderError,
    RoutePattern,
};
pub use locale::LocaleTag;
pub use parser::{
    BasicParser,
    Parser,
};
pub use translate::Translator;

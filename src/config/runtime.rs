//! Runtime configuration of an [`crate::I18n`] instance.

use std::sync::Arc;
use std::time::Duration;

use crate::flatten::Preprocess;
use crate::loader::LoaderDescriptor;
use crate::locale::LocaleTag;
use crate::logger::LogSettings;
use crate::node::Translations;
use crate::parser::{
    BasicParser,
    Parser,
};

/// Default cache window: one day.
pub const DEFAULT_CACHE: Duration = Duration::from_millis(86_400_000);

/// Every recognized option.
///
/// A configuration is immutable once loaded; loading another one replaces it
/// as a whole.
#[derive(Debug, Clone)]
pub struct Config {
    /// Registered loaders.
    pub loaders: Vec<LoaderDescriptor>,
    /// Translations merged when the configuration is loaded.
    pub translations: Translations,
    /// Locale loaded right after the configuration.
    pub init_locale: Option<LocaleTag>,
    /// Locale consulted for keys missing in the active locale.
    pub fallback_locale: Option<LocaleTag>,
    /// Value for keys missing everywhere. `Some(None)` is a configured empty
    /// value; `None` leaves missing keys to the parser.
    pub fallback_value: Option<Option<String>>,
    pub preprocess: Preprocess,
    /// Time after which loaded namespaces are fetched again.
    pub cache: Duration,
    /// Replaces the process-wide logger when set.
    pub log: Option<LogSettings>,
    pub parser: Arc<dyn Parser>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loaders: Vec::new(),
            translations: Translations::new(),
            init_locale: None,
            fallback_locale: None,
            fallback_value: None,
            preprocess: Preprocess::default(),
            cache: DEFAULT_CACHE,
            log: None,
            parser: Arc::new(BasicParser),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_loader(mut self, loader: LoaderDescriptor) -> Self {
        self.loaders.push(loader);
        self
    }

    #[must_use]
    pub fn with_loaders(mut self, loaders: impl IntoIterator<Item = LoaderDescriptor>) -> Self {
        self.loaders.extend(loaders);
        self
    }

    /// Adds static translations, overlaying namespaces per locale.
    #[must_use]
    pub fn with_translations(mut self, translations: Translations) -> Self {
        for (locale, data) in translations {
            self.translations.entry(locale).or_default().extend(data);
        }
        self
    }

    #[must_use]
    pub fn with_init_locale(mut self, locale: &str) -> Self {
        self.init_locale = LocaleTag::parse(locale);
        self
    }

    #[must_use]
    pub fn with_fallback_locale(mut self, locale: &str) -> Self {
        self.fallback_locale = LocaleTag::parse(locale);
        self
    }

    /// Configures the fallback value; `None` configures an empty one.
    #[must_use]
    pub fn with_fallback_value(mut self, value: Option<&str>) -> Self {
        self.fallback_value = Some(value.map(str::to_string));
        self
    }

    #[must_use]
    pub fn with_preprocess(mut self, preprocess: Preprocess) -> Self {
        self.preprocess = preprocess;
        self
    }

    #[must_use]
    pub const fn with_cache(mut self, cache: Duration) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_log(mut self, log: LogSettings) -> Self {
        self.log = Some(log);
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: impl Parser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }
}

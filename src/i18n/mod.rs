//! The i18n instance.
//!
//! [`I18n`] ties the stores together. Every derived value is recomputed by an
//! explicit edge registered in [`I18n::new`]:
//!
//! | source                              | derived                        |
//! |-------------------------------------|--------------------------------|
//! | requested locale, route             | load cycle (`engine`)          |
//! | config, translations                | known locales                  |
//! | published locale, route, translations | initialized (latches)        |
//! | config, translations, locale, loading | translator                   |

mod derived;
mod engine;

use std::fmt;
use std::sync::{
    Arc,
    Mutex,
    Weak,
};

use futures::FutureExt;
use futures::future::{
    BoxFuture,
    ready,
};
use serde_json::Value;

pub use engine::TranslationProps;

use crate::config::Config;
use crate::loader::LoaderDescriptor;
use crate::locale::LocaleTag;
use crate::logger::{
    self,
    Logger,
};
use crate::node::{
    LoadedKeys,
    Translations,
};
use crate::store::{
    Loading,
    Observable,
    Readable,
    Subscription,
    TranslationStore,
    lock,
};
use crate::translate::Translator;

/// State shared by every clone of an [`I18n`].
struct Inner {
    /// Current configuration; `None` keeps the instance inert.
    config: Observable<Option<Arc<Config>>>,
    /// Translation tables and loaded keys.
    store: TranslationStore,
    /// Loading flag and in-flight loads.
    loading: Loading,
    /// Locale asked for by the caller, normalized.
    requested_locale: Observable<Option<LocaleTag>>,
    /// Locale resolved after loading; what `t` translates with.
    locale: Observable<Option<LocaleTag>>,
    /// Active route. An empty route counts as set.
    route: Observable<Option<String>>,
    /// Locales known from loaders and translation tables.
    locales: Observable<Vec<LocaleTag>>,
    /// Latched once locale, route and translations were all present.
    initialized: Observable<bool>,
    /// Derived translate functions.
    translator: Observable<Translator>,
    /// Last `(locale, route)` pair a load cycle was started for.
    last_trigger: Mutex<Option<(LocaleTag, String)>>,
    /// Registered edges; dropped with the instance.
    edges: Mutex<Vec<Subscription>>,
}

/// An i18n state manager.
///
/// Cloning is cheap; clones share the same state. Load cycles are spawned on
/// the current Tokio runtime when there is one. Without a runtime they run
/// when the future returned by the triggering call is awaited.
///
/// # Examples
/// ```
/// use routed_i18n::{Config, I18n};
/// use routed_i18n::node::translations_from_json;
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let i18n = I18n::new();
/// let translations = translations_from_json(json!({ "en": { "common": { "hi": "Hi {0}" } } }));
/// i18n.load_config(Config::new().with_translations(translations).with_init_locale("en")).await;
///
/// assert_eq!(i18n.t("common.hi", &[json!("Ann")]), "Hi Ann");
/// # });
/// ```
#[derive(Clone)]
pub struct I18n {
    /// Shared state
    inner: Arc<Inner>,
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

impl I18n {
    /// Creates an inert instance; nothing loads until a configuration is
    /// loaded.
    #[must_use]
    pub fn new() -> Self {
        let inner = Arc::new(Inner {
            config: Observable::new(None),
            store: TranslationStore::new(),
            loading: Loading::new(),
            requested_locale: Observable::new(None),
            locale: Observable::new(None),
            route: Observable::new(None),
            locales: Observable::new(Vec::new()),
            initialized: Observable::new(false),
            translator: Observable::new(Translator::default()),
            last_trigger: Mutex::new(None),
            edges: Mutex::new(Vec::new()),
        });
        Inner::connect(&inner);
        Self { inner }
    }

    /// Creates an instance and starts loading `config`.
    ///
    /// Use [`I18n::load_config`] to wait for the initial load.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let i18n = Self::new();
        drop(i18n.load_config(config));
        i18n
    }

    /// Replaces the configuration.
    ///
    /// Applies the `log` settings, merges the static translations and loads
    /// the initial locale on the current route (or `""`). The returned future
    /// resolves once that load has settled.
    pub fn load_config(&self, config: Config) -> BoxFuture<'static, ()> {
        if let Some(log) = &config.log {
            logger::set_logger(Logger::new(log));
        }

        logger::current().debug("Setting config.");

        let config = Arc::new(config);
        self.inner.config.set(Some(Arc::clone(&config)));

        if !config.translations.is_empty() {
            self.inner.add_translations(&config.translations, None);
        }

        match &config.init_locale {
            Some(locale) => self.load_tag(locale.clone(), None),
            None => ready(()).boxed(),
        }
    }

    /// Requests `locale`.
    ///
    /// Blank input and the already requested locale are ignored. The returned
    /// future resolves once the loads for the new locale on the current route
    /// have settled.
    pub fn set_locale(&self, locale: &str) -> BoxFuture<'static, ()> {
        LocaleTag::parse(locale).map_or_else(|| ready(()).boxed(), |tag| self.set_tag(tag))
    }

    /// Sets the active route.
    ///
    /// Setting the current route again is a no-op.
    pub fn set_route(&self, route: &str) -> BoxFuture<'static, ()> {
        if self.inner.route.get().as_deref() == Some(route) {
            return ready(()).boxed();
        }

        logger::current().debug(format!("Setting '{route}' route."));
        self.inner.route.set(Some(route.to_string()));

        let locale = self.inner.requested_locale.get();
        self.inner.loading.wait_for(locale.as_ref(), Some(route))
    }

    /// Sets `route` (default: the current route, or `""`) and then `locale`.
    ///
    /// Resolves once the loads for that pair have settled.
    pub fn load_translations(&self, locale: &str, route: Option<&str>) -> BoxFuture<'static, ()> {
        LocaleTag::parse(locale)
            .map_or_else(|| ready(()).boxed(), |tag| self.load_tag(tag, route))
    }

    /// Merges translations directly, bypassing loaders.
    ///
    /// The loaded namespaces are `keys` when given, otherwise the first
    /// segment of each top-level key.
    pub fn add_translations(&self, translations: &Translations, keys: Option<&LoadedKeys>) {
        self.inner.add_translations(translations, keys);
    }

    /// Loaders that a cycle for `locale` and `route` would run now.
    ///
    /// Defaults to the published locale and the current route.
    #[must_use]
    pub fn applicable_loaders(
        &self,
        locale: Option<&str>,
        route: Option<&str>,
    ) -> Vec<LoaderDescriptor> {
        let Some(config) = self.inner.config.get() else {
            return Vec::new();
        };
        let Some(locale) = self.resolve_tag(locale) else {
            return Vec::new();
        };
        let route = self.resolve_route(route);

        self.inner.applicable_loaders(&config, &locale, &route)
    }

    /// Fetches what a cycle for `locale` and `route` would load, without
    /// merging it.
    ///
    /// Defaults to the published locale and the current route. Returns `None`
    /// when there is nothing to load.
    pub fn translation_props(
        &self,
        locale: Option<&str>,
        route: Option<&str>,
    ) -> BoxFuture<'static, Option<TranslationProps>> {
        let Some(locale) = self.resolve_tag(locale) else {
            return ready(None).boxed();
        };
        let route = self.resolve_route(route);
        let inner = Arc::clone(&self.inner);

        async move { inner.translation_props(&locale, &route).await }.boxed()
    }

    #[must_use]
    pub fn loading(&self) -> &Loading {
        &self.inner.loading
    }

    /// The published locale.
    #[must_use]
    pub fn locale(&self) -> Readable<Option<LocaleTag>> {
        self.inner.locale.readable()
    }

    #[must_use]
    pub fn route(&self) -> Readable<Option<String>> {
        self.inner.route.readable()
    }

    #[must_use]
    pub fn locales(&self) -> Readable<Vec<LocaleTag>> {
        self.inner.locales.readable()
    }

    /// Preprocessed translations per locale.
    #[must_use]
    pub fn translations(&self) -> Readable<Translations> {
        self.inner.store.flat().readable()
    }

    /// Translations as they were merged, before preprocessing.
    #[must_use]
    pub fn raw_translations(&self) -> Readable<Translations> {
        self.inner.store.raw().readable()
    }

    #[must_use]
    pub fn initialized(&self) -> Readable<bool> {
        self.inner.initialized.readable()
    }

    /// Translate functions; subscribers are notified when the published
    /// locale's table is ready or the configuration changes.
    #[must_use]
    pub fn translator(&self) -> Readable<Translator> {
        self.inner.translator.readable()
    }

    #[must_use]
    pub fn config(&self) -> Option<Arc<Config>> {
        self.inner.config.get()
    }

    #[must_use]
    pub fn loaded_keys(&self) -> LoadedKeys {
        self.inner.store.loaded_keys()
    }

    /// Translates `key` in the published locale against the current
    /// translations.
    #[must_use]
    pub fn t(&self, key: &str, params: &[Value]) -> String {
        self.inner.live_translator().t(key, params)
    }

    /// Translates `key` in `locale` against the current translations.
    #[must_use]
    pub fn l(&self, locale: &str, key: &str, params: &[Value]) -> String {
        self.inner.live_translator().l(locale, key, params)
    }

    /// Requests an already normalized locale.
    fn set_tag(&self, tag: LocaleTag) -> BoxFuture<'static, ()> {
        if self.inner.requested_locale.get().as_ref() == Some(&tag) {
            return ready(()).boxed();
        }

        logger::current().debug(format!("Setting '{tag}' locale."));
        self.inner.requested_locale.set(Some(tag.clone()));

        let route = self.inner.route.get();
        self.inner.loading.wait_for(Some(&tag), route.as_deref())
    }

    /// [`I18n::load_translations`] with an already normalized locale.
    fn load_tag(&self, tag: LocaleTag, route: Option<&str>) -> BoxFuture<'static, ()> {
        let route = self.resolve_route(route);

        drop(self.set_route(&route));
        drop(self.set_tag(tag.clone()));

        self.inner.loading.wait_for(Some(&tag), Some(&route))
    }

    /// `locale` normalized, or the published locale.
    fn resolve_tag(&self, locale: Option<&str>) -> Option<LocaleTag> {
        locale.map_or_else(|| self.inner.locale.get(), LocaleTag::parse)
    }

    /// `route`, or the current route, or `""`.
    fn resolve_route(&self, route: Option<&str>) -> String {
        route.map_or_else(|| self.inner.route.get().unwrap_or_default(), str::to_string)
    }
}

impl fmt::Debug for I18n {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I18n")
            .field("locale", &self.inner.locale.get())
            .field("route", &self.inner.route.get())
            .field("loading", &self.inner.loading.get())
            .field("initialized", &self.inner.initialized.get())
            .finish_non_exhaustive()
    }
}

impl Inner {
    /// Registers every edge of the recompute graph.
    fn connect(inner: &Arc<Self>) {
        let weak = Arc::downgrade(inner);

        let edges = vec![
            inner.requested_locale.subscribe(edge::<Option<LocaleTag>>(&weak, Self::trigger)),
            inner.route.subscribe(edge::<Option<String>>(&weak, Self::trigger)),
            inner.config.subscribe(edge::<Option<Arc<Config>>>(&weak, Self::recompute_locales)),
            inner.store.flat().subscribe(edge::<Translations>(&weak, Self::recompute_locales)),
            inner.locale.subscribe(edge::<Option<LocaleTag>>(&weak, Self::recompute_initialized)),
            inner.route.subscribe(edge::<Option<String>>(&weak, Self::recompute_initialized)),
            inner.store.flat().subscribe(edge::<Translations>(&weak, Self::recompute_initialized)),
            inner.config.subscribe(edge::<Option<Arc<Config>>>(&weak, Self::reset_translator)),
            inner.store.flat().subscribe(edge::<Translations>(&weak, Self::refresh_translator)),
            inner.locale.subscribe(edge::<Option<LocaleTag>>(&weak, Self::refresh_translator)),
            inner.loading.subscribe(edge::<bool>(&weak, Self::refresh_translator)),
        ];

        lock(&inner.edges).extend(edges);
    }
}

/// Listener running `recompute` on the instance behind `weak`, if alive.
fn edge<T: 'static>(
    weak: &Weak<Inner>,
    recompute: fn(&Arc<Inner>),
) -> impl Fn(&T) + Send + Sync + 'static {
    let weak = Weak::clone(weak);
    move |_| {
        if let Some(inner) = weak.upgrade() {
            recompute(&inner);
        }
    }
}

//! Loader scheduling.
//!
//! A change of the requested locale or of the route starts a load cycle for
//! the new `(locale, route)` pair. The cycle selects the loaders that apply
//! and are not loaded yet, fetches them, merges the result and publishes the
//! resolved locale.

use std::sync::Arc;

use tokio::time::Instant;

use super::Inner;
use crate::config::Config;
use crate::loader::{
    LoaderDescriptor,
    fetch_translations,
    landed_keys,
};
use crate::locale::LocaleTag;
use crate::logger;
use crate::node::{
    LoadedKeys,
    Translations,
};
use crate::store::lock;

/// What a load cycle fetched, before it is merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationProps {
    /// Fetched namespaces per locale (`{ "common": {...} }`).
    pub translations: Translations,
    /// Namespaces of the applicable loaders that returned data.
    pub keys: LoadedKeys,
}

impl Inner {
    /// Starts a load cycle if both the requested locale and the route are set
    /// and the pair differs from the last one.
    pub(super) fn trigger(inner: &Arc<Self>) {
        let (Some(locale), Some(route)) = (inner.requested_locale.get(), inner.route.get()) else {
            return;
        };

        {
            let mut last_trigger = lock(&inner.last_trigger);
            if last_trigger.as_ref().is_some_and(|(l, r)| *l == locale && *r == route) {
                return;
            }
            *last_trigger = Some((locale.clone(), route.clone()));
        }

        logger::current().debug("Triggering translation load...");
        Self::start_cycle(inner, locale, route);
    }

    /// Tracks and starts the cycle of `(locale, route)`.
    fn start_cycle(inner: &Arc<Self>, locale: LocaleTag, route: String) {
        logger::current().debug("Adding loader promise.");

        let work = {
            let inner = Arc::clone(inner);
            let locale = locale.clone();
            let route = route.clone();
            async move {
                if let Some(props) = inner.translation_props(&locale, &route).await {
                    inner.add_translations(&props.translations, Some(&props.keys));
                }
                inner.publish_locale(&locale);
            }
        };

        drop(inner.loading.track(locale, route, work));
    }

    /// Loaders to run for `locale` on `route`.
    ///
    /// A loader applies when its routes allow `route` and its namespace is
    /// missing for either `locale` or the fallback locale it belongs to.
    pub(super) fn applicable_loaders(
        &self,
        config: &Config,
        locale: &LocaleTag,
        route: &str,
    ) -> Vec<LoaderDescriptor> {
        let fallback = config.fallback_locale.as_ref();

        config
            .loaders
            .iter()
            .filter(|descriptor| descriptor.applies_to(route))
            .filter(|descriptor| {
                let missing_for = |target: &LocaleTag| {
                    descriptor.locale == *target && !self.store.is_loaded(target, &descriptor.key)
                };
                missing_for(locale) || fallback.is_some_and(missing_for)
            })
            .cloned()
            .collect()
    }

    /// Fetches the applicable loaders of `(locale, route)`.
    ///
    /// Returns `None`, without touching the loading flag, when nothing
    /// applies or no configuration is loaded.
    pub(super) async fn translation_props(
        &self,
        locale: &LocaleTag,
        route: &str,
    ) -> Option<TranslationProps> {
        let Some(config) = self.config.get() else {
            logger::current().error("No config provided!");
            return None;
        };

        if self.store.refresh_cache(config.cache, Instant::now()) {
            logger::current().debug("Refreshing cache.");
        }

        let descriptors = self.applicable_loaders(&config, locale, route);
        if descriptors.is_empty() {
            return None;
        }

        let translations = {
            let _loading = self.loading.begin();
            logger::current().debug("Fetching translations...");
            fetch_translations(&descriptors).await
        };

        let keys = landed_keys(&descriptors, &translations);
        Some(TranslationProps { translations, keys })
    }

    /// Merges `translations` with the configured preprocessing.
    pub(super) fn add_translations(&self, translations: &Translations, keys: Option<&LoadedKeys>) {
        if translations.is_empty() {
            return;
        }

        logger::current().debug("Adding translations...");

        let preprocess = self.config.get().map(|config| config.preprocess.clone()).unwrap_or_default();
        self.store.merge(translations, keys, &preprocess);
    }

    /// Publishes the locale a finished cycle for `requested` resolves to.
    ///
    /// Skipped if another locale has been requested meanwhile.
    fn publish_locale(&self, requested: &LocaleTag) {
        if self.requested_locale.get().as_ref() != Some(requested) {
            return;
        }

        if let Some(resolved) = self.resolve_locale(requested)
            && self.locale.set_if_changed(Some(resolved.clone()))
        {
            logger::current().debug(format!("Locale '{resolved}' published."));
        }
    }

    /// `requested` if it is a known locale, else the fallback locale.
    fn resolve_locale(&self, requested: &LocaleTag) -> Option<LocaleTag> {
        if self.locales.get().contains(requested) {
            return Some(requested.clone());
        }

        self.config.get().and_then(|config| config.fallback_locale.clone())
    }
}

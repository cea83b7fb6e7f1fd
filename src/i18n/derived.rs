//! Values derived from the instance state.

use std::sync::Arc;

use super::Inner;
use crate::locale::LocaleTag;
use crate::translate::Translator;

impl Inner {
    /// Known locales: loader locales first, then translation table locales.
    pub(super) fn recompute_locales(inner: &Arc<Self>) {
        let Some(config) = inner.config.get() else {
            inner.locales.set_if_changed(Vec::new());
            return;
        };

        let mut table_locales: Vec<LocaleTag> = inner.store.flat().get().into_keys().collect();
        table_locales.sort();

        let mut locales: Vec<LocaleTag> = Vec::new();
        for locale in config.loaders.iter().map(|descriptor| &descriptor.locale).chain(&table_locales) {
            if !locales.contains(locale) {
                locales.push(locale.clone());
            }
        }

        inner.locales.set_if_changed(locales);
    }

    /// Latches `initialized` once a locale is published, a route is set and
    /// some translations exist.
    pub(super) fn recompute_initialized(inner: &Arc<Self>) {
        if inner.initialized.get() {
            return;
        }

        let ready = inner.locale.get().is_some()
            && inner.route.get().is_some()
            && !inner.store.flat().get().is_empty();

        if ready {
            inner.initialized.set(true);
        }
    }

    /// Notifies translator subscribers of a new configuration.
    pub(super) fn reset_translator(inner: &Arc<Self>) {
        inner.translator.set(inner.live_translator());
    }

    /// Notifies translator subscribers once the published locale has
    /// translations and no load is running.
    pub(super) fn refresh_translator(inner: &Arc<Self>) {
        if inner.loading.get() {
            return;
        }

        let Some(locale) = inner.locale.get() else {
            return;
        };

        let has_table =
            inner.store.flat().get().get(&locale).is_some_and(|table| !table.is_empty());
        if has_table {
            inner.translator.set(inner.live_translator());
        }
    }

    /// Translator reading the current configuration, translations and
    /// published locale.
    pub(super) fn live_translator(&self) -> Translator {
        Translator::new(self.config.readable(), self.store.flat().readable(), self.locale.readable())
    }
}

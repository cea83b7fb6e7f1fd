//! Translation tables and the loaded-keys index.

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use super::{
    Observable,
    lock,
};
use crate::flatten::{
    KEY_SEPARATOR,
    Preprocess,
};
use crate::locale::LocaleTag;
use crate::node::{
    LoadedKeys,
    ObjectMap,
    Translations,
};

/// Raw and preprocessed translations with their bookkeeping.
///
/// Both tables are only ever overlaid and the loaded-keys index only grows,
/// except when the cache window expires and the index is cleared as a whole.
#[derive(Debug)]
pub struct TranslationStore {
    /// Nested data, pre-preprocess.
    raw: Observable<Translations>,
    /// Data after preprocessing.
    flat: Observable<Translations>,
    /// Namespace keys merged per locale.
    loaded_keys: Mutex<LoadedKeys>,
    /// Start of the current cache window.
    cached_at: Mutex<Option<Instant>>,
}

impl Default for TranslationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw: Observable::new(Translations::new()),
            flat: Observable::new(Translations::new()),
            loaded_keys: Mutex::new(LoadedKeys::new()),
            cached_at: Mutex::new(None),
        }
    }

    /// Nested translations as they were merged.
    #[must_use]
    pub const fn raw(&self) -> &Observable<Translations> {
        &self.raw
    }

    /// Preprocessed translations read by the translate functions.
    #[must_use]
    pub const fn flat(&self) -> &Observable<Translations> {
        &self.flat
    }

    #[must_use]
    pub fn loaded_keys(&self) -> LoadedKeys {
        lock(&self.loaded_keys).clone()
    }

    /// Returns true if namespace `key` has been merged for `locale`.
    #[must_use]
    pub fn is_loaded(&self, locale: &LocaleTag, key: &str) -> bool {
        lock(&self.loaded_keys).get(locale).is_some_and(|keys| keys.contains(key))
    }

    /// Merges a per-locale fragment.
    ///
    /// The fragment overlays the raw table as it is and the flattened table
    /// after `preprocess`. The keys recorded for a locale are taken from
    /// `explicit_keys` when it lists that locale, otherwise from the first
    /// segment of every top-level key of the fragment.
    pub fn merge(
        &self,
        fragment: &Translations,
        explicit_keys: Option<&LoadedKeys>,
        preprocess: &Preprocess,
    ) {
        if fragment.is_empty() {
            return;
        }

        {
            let mut loaded_keys = lock(&self.loaded_keys);
            for (locale, data) in fragment {
                let keys = explicit_keys
                    .and_then(|explicit| explicit.get(locale))
                    .cloned()
                    .unwrap_or_else(|| derive_keys(data));
                loaded_keys.entry(locale.clone()).or_default().extend(keys);
            }
        }

        self.raw.update(|current| {
            let mut next = current.clone();
            for (locale, data) in fragment {
                next.entry(locale.clone()).or_default().extend(data.clone());
            }
            next
        });

        self.flat.update(|current| {
            let mut next = current.clone();
            for (locale, data) in fragment {
                next.entry(locale.clone()).or_default().extend(preprocess.apply(data));
            }
            next
        });
    }

    /// Runs the cache clock at `now`.
    ///
    /// The first call starts the window. Once `window` has elapsed the
    /// loaded-keys index is cleared and the clock stops until the next call.
    /// Returns true if the index was cleared.
    pub fn refresh_cache(&self, window: Duration, now: Instant) -> bool {
        let mut cached_at = lock(&self.cached_at);

        match *cached_at {
            None => {
                *cached_at = Some(now);
                false
            }
            Some(started) if now > started + window => {
                lock(&self.loaded_keys).clear();
                *cached_at = None;
                true
            }
            Some(_) => false,
        }
    }
}

/// Namespace keys of a fragment: the first segment of each top-level key.
fn derive_keys(data: &ObjectMap) -> BTreeSet<String> {
    data.keys()
        .filter_map(|key| key.split(KEY_SEPARATOR).next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

//! Concurrent invocation of loaders.

use futures::future::join_all;

use super::LoaderDescriptor;
use crate::logger;
use crate::node::{
    LoadedKeys,
    Translations,
};

/// Runs every loader concurrently and groups the results per locale.
///
/// Each locale receives an object keyed by namespace (`{ "common": {...} }`).
/// A failing loader is logged and contributes nothing; the other loaders are
/// unaffected. Loaders yielding `null` are skipped.
pub async fn fetch_translations(descriptors: &[LoaderDescriptor]) -> Translations {
    let results = join_all(descriptors.iter().map(|descriptor| async move {
        (descriptor, descriptor.loader.load().await)
    }))
    .await;

    let mut translations = Translations::new();

    for (descriptor, result) in results {
        match result {
            Ok(data) if data.is_null() => {
                logger::current().debug(format!(
                    "Loader '{}' > '{}' returned no data.",
                    descriptor.locale, descriptor.key
                ));
            }
            Ok(data) => {
                translations
                    .entry(descriptor.locale.clone())
                    .or_default()
                    .insert(descriptor.key.clone(), data);
            }
            Err(error) => {
                let logger = logger::current();
                logger.error(format!(
                    "Failed to load translation. Verify your '{}' > '{}' Loader.",
                    descriptor.locale, descriptor.key
                ));
                logger.error(error.to_string());
            }
        }
    }

    translations
}

/// Collects the namespace keys of `descriptors` that landed in `translations`.
pub(crate) fn landed_keys(
    descriptors: &[LoaderDescriptor],
    translations: &Translations,
) -> LoadedKeys {
    let mut keys = LoadedKeys::new();

    for descriptor in descriptors {
        let landed = translations
            .get(&descriptor.locale)
            .is_some_and(|namespaces| namespaces.contains_key(&descriptor.key));

        if landed {
            keys.entry(descriptor.locale.clone()).or_default().insert(descriptor.key.clone());
        }
    }

    keys
}

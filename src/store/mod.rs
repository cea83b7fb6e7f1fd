//! State held by an [`crate::I18n`] instance.
//!
//! - [`observable`]: get / set / subscribe values published to callers
//! - [`translations`]: raw and preprocessed tables, loaded keys and cache clock
//! - [`loading`]: the loading flag and the registry of in-flight loads

pub mod loading;
pub mod observable;
pub mod translations;

use std::sync::{
    Mutex,
    MutexGuard,
    PoisonError,
};

pub use loading::Loading;
pub use observable::{
    Observable,
    Readable,
    Subscription,
};
pub use translations::TranslationStore;

/// Locks `mutex`, recovering the data if a listener panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

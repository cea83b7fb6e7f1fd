//! Loading flag and the registry of in-flight loads.
//!
//! Every load cycle is tracked as a pending record keyed by its
//! `(locale, route)` pair so that callers can wait for the loads they care
//! about. The flag is true while at least one cycle runs. Records are purged
//! as a batch once all of them have settled.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
    Weak,
};

use futures::FutureExt;
use futures::future::{
    BoxFuture,
    Shared,
    join_all,
};

use super::{
    Observable,
    Subscription,
    lock,
};
use crate::locale::LocaleTag;

/// Completion handle of one load cycle.
type Completion = Shared<BoxFuture<'static, ()>>;

/// One tracked load cycle.
struct PendingRecord {
    /// Locale the cycle was started for.
    locale: LocaleTag,
    /// Route the cycle was started for.
    route: String,
    /// Set once the work has finished.
    settled: Arc<AtomicBool>,
    /// Resolves when the work has finished.
    completion: Completion,
}

/// Registry of load cycles that have not been purged yet.
#[derive(Default)]
struct PendingLoads {
    /// Records in start order.
    records: Mutex<Vec<PendingRecord>>,
}

impl PendingLoads {
    /// Drops every record once none of them is still running.
    fn purge_if_idle(&self) {
        let mut records = lock(&self.records);
        if records.iter().all(|record| record.settled.load(Ordering::SeqCst)) {
            records.clear();
        }
    }

    /// Completions of the records matching the filters.
    fn matching(&self, locale: Option<&LocaleTag>, route: Option<&str>) -> Vec<Completion> {
        lock(&self.records)
            .iter()
            .filter(|record| locale.is_none_or(|locale| &record.locale == locale))
            .filter(|record| route.is_none_or(|route| record.route == route))
            .map(|record| record.completion.clone())
            .collect()
    }
}

/// Loading state shared by an instance and its callers.
#[derive(Clone)]
pub struct Loading {
    /// Published flag.
    flag: Observable<bool>,
    /// Number of running cycles.
    active: Arc<Mutex<usize>>,
    /// In-flight registry.
    pending: Arc<PendingLoads>,
}

impl Default for Loading {
    fn default() -> Self {
        Self::new()
    }
}

impl Loading {
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Observable::new(false),
            active: Arc::new(Mutex::new(0)),
            pending: Arc::new(PendingLoads::default()),
        }
    }

    /// Returns true while a load cycle is running.
    #[must_use]
    pub fn get(&self) -> bool {
        self.flag.get()
    }

    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe(&self, listener: impl Fn(&bool) + Send + Sync + 'static) -> Subscription {
        self.flag.subscribe(listener)
    }

    /// Waits for the tracked loads matching `locale` and `route`.
    ///
    /// `None` matches every value. Resolves immediately when nothing matches.
    pub fn wait(&self, locale: Option<&str>, route: Option<&str>) -> BoxFuture<'static, ()> {
        let locale = locale.and_then(LocaleTag::parse);
        self.wait_for(locale.as_ref(), route)
    }

    /// [`Loading::wait`] with an already normalized locale.
    pub(crate) fn wait_for(
        &self,
        locale: Option<&LocaleTag>,
        route: Option<&str>,
    ) -> BoxFuture<'static, ()> {
        let completions = self.pending.matching(locale, route);
        join_all(completions).map(|_| ()).boxed()
    }

    /// Number of tracked records, settled ones included.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        lock(&self.pending.records).len()
    }

    /// Tracks `work` as the load cycle of `(locale, route)`.
    ///
    /// The work is spawned when a Tokio runtime is available; otherwise it
    /// runs when the returned future is polled.
    pub(crate) fn track<F>(&self, locale: LocaleTag, route: String, work: F) -> BoxFuture<'static, ()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let settled = Arc::new(AtomicBool::new(false));
        let registry: Weak<PendingLoads> = Arc::downgrade(&self.pending);
        let completion = {
            let settled = Arc::clone(&settled);
            async move {
                work.await;
                settled.store(true, Ordering::SeqCst);
                if let Some(registry) = registry.upgrade() {
                    registry.purge_if_idle();
                }
            }
            .boxed()
            .shared()
        };

        lock(&self.pending.records).push(PendingRecord {
            locale,
            route,
            settled,
            completion: completion.clone(),
        });

        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(completion.clone());
        }

        completion.boxed()
    }

    /// Marks a cycle as running until the guard is dropped.
    pub(crate) fn begin(&self) -> LoadingGuard {
        *lock(&self.active) += 1;
        self.publish();
        LoadingGuard { loading: self.clone() }
    }

    /// Counterpart of [`Loading::begin`], called by the guard.
    fn finish(&self) {
        {
            let mut active = lock(&self.active);
            *active = active.saturating_sub(1);
        }
        self.publish();
    }

    /// Publishes the flag outside the counter lock; retries if another cycle
    /// started or finished meanwhile.
    fn publish(&self) {
        loop {
            let running = *lock(&self.active) > 0;
            self.flag.set_if_changed(running);
            if (*lock(&self.active) > 0) == running {
                break;
            }
        }
    }
}

impl fmt::Debug for Loading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loading")
            .field("loading", &self.get())
            .field("pending", &self.pending_count())
            .finish()
    }
}

/// Keeps the loading flag raised while alive.
pub(crate) struct LoadingGuard {
    /// State to release on drop.
    loading: Loading,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.loading.finish();
    }
}

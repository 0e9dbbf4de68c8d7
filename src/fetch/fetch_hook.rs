use super::lifecycle::Lifecycle;
use super::state::{FetchState, StateSurface};
use super::transport::Transport;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::{debug, info};

/// Anything a [`Refetch`] handle can restart
trait Restart: Send + Sync {
    fn restart_attempt(self: Arc<Self>) -> Option<u64>;
}

impl<T, S> Restart for Lifecycle<T, S>
where
    T: DeserializeOwned + Send + 'static,
    S: StateSurface<T>,
{
    fn restart_attempt(self: Arc<Self>) -> Option<u64> {
        self.restart()
    }
}

struct RefetchInner {
    trigger: AtomicU64,
    target: Weak<dyn Restart>,
}

/// Stable handle that forces a new attempt for the current key.
///
/// Created once per [`FetchHook`]; every clone points at the same handle, so
/// `ptr_eq` (and `==`) hold across any number of state updates. Triggering
/// after the hook is gone does nothing.
#[derive(Clone)]
pub struct Refetch {
    inner: Arc<RefetchInner>,
}

impl Refetch {
    fn new<T, S>(core: &Arc<Lifecycle<T, S>>) -> Self
    where
        T: DeserializeOwned + Send + 'static,
        S: StateSurface<T>,
    {
        let target: Arc<dyn Restart> = core.clone();
        Self {
            inner: Arc::new(RefetchInner {
                trigger: AtomicU64::new(0),
                target: Arc::downgrade(&target),
            }),
        }
    }

    /// Bump the trigger counter and start a new attempt
    pub fn trigger(&self) {
        let count = self.inner.trigger.fetch_add(1, Ordering::Relaxed) + 1;
        match self.inner.target.upgrade() {
            Some(target) => {
                debug!(trigger = count, "refetch requested");
                target.restart_attempt();
            }
            None => debug!(trigger = count, "refetch after teardown ignored"),
        }
    }

    /// Number of times this handle has been triggered
    #[must_use]
    pub fn count(&self) -> u64 {
        self.inner.trigger.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Refetch {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Refetch {}

impl std::fmt::Debug for Refetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Refetch").field("count", &self.count()).finish()
    }
}

/// Everything presentation code needs from a keyed fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchView<T> {
    pub data: T,
    pub is_loading: bool,
    pub error: Option<String>,
    pub refetch: Refetch,
}

impl<T> FetchView<T> {
    /// Loading with nothing settled yet
    #[must_use]
    pub const fn is_initial_loading(&self, has_data: bool) -> bool {
        self.is_loading && !has_data && self.error.is_none()
    }
}

/// Fetches the resource named by a key, refetching on key change or on
/// demand. Only the most recently started attempt may write state.
///
/// Dropping the hook cancels the in-flight attempt.
pub struct FetchHook<T> {
    core: Arc<Lifecycle<T, FetchState<T>>>,
    key: String,
    refetch: Refetch,
}

impl<T> FetchHook<T>
where
    T: DeserializeOwned + Default + Clone + Send + Sync + 'static,
{
    /// Mount the hook and start the first attempt.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime
    pub fn new(transport: Arc<dyn Transport>, key: impl Into<String>) -> Self {
        let key = key.into();
        let core = Lifecycle::new(transport, key.clone());
        let refetch = Refetch::new(&core);
        info!(instance = %core.instance(), key = %key, "fetch hook mounted");
        core.start(&key);
        Self { core, key, refetch }
    }

    /// Switch to another resource; an unchanged key does nothing
    pub fn set_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key == self.key {
            return;
        }
        debug!(instance = %self.core.instance(), from = %self.key, to = %key, "key changed");
        self.key = key;
        self.core.start(&self.key);
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn refetch(&self) -> &Refetch {
        &self.refetch
    }

    #[must_use]
    pub fn state(&self) -> FetchState<T> {
        self.core.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.core.subscribe()
    }

    #[must_use]
    pub fn view(&self) -> FetchView<T> {
        let FetchState {
            data,
            is_loading,
            error,
        } = self.core.snapshot();
        FetchView {
            data,
            is_loading,
            error,
            refetch: self.refetch.clone(),
        }
    }

    /// Attempts started since mount, superseded ones included
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.core.attempts()
    }
}

impl<T> Drop for FetchHook<T> {
    fn drop(&mut self) {
        self.core.teardown();
        info!(instance = %self.core.instance(), key = %self.key, "fetch hook unmounted");
    }
}

use super::errors::FetchError;
use super::state::StateSurface;
use super::transport::Transport;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span, trace, warn};
use uuid::Uuid;

/// The attempt currently allowed to write state
#[derive(Debug)]
struct Live {
    id: u64,
    url: String,
    token: CancellationToken,
    /// Generation of the polling schedule allowed to start attempts
    session: u64,
    closed: bool,
}

/// Attempt sequencing shared by the keyed and the polling hook.
///
/// Every `start` cancels the previous attempt and hands out a fresh token.
/// Outcomes are applied under the `live` lock only if the attempt is still the
/// live one, so a late response from a superseded attempt can never overwrite
/// state written by a newer one, whatever order responses arrive in.
pub(crate) struct Lifecycle<T, S> {
    instance: Uuid,
    transport: Arc<dyn Transport>,
    live: Mutex<Live>,
    state: watch::Sender<S>,
    started: AtomicU64,
    _data: PhantomData<fn() -> T>,
}

impl<T, S> Lifecycle<T, S> {
    pub(crate) const fn instance(&self) -> Uuid {
        self.instance
    }

    fn lock_live(&self) -> MutexGuard<'_, Live> {
        // Live holds no invariant a panicking writer could break halfway
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancel the live attempt and refuse any further starts
    pub(crate) fn teardown(&self) {
        let mut live = self.lock_live();
        if live.closed {
            return;
        }
        live.token.cancel();
        live.id += 1;
        live.closed = true;
        debug!(instance = %self.instance, "torn down");
    }

    pub(crate) fn attempts(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub(crate) fn live_id(&self) -> u64 {
        self.lock_live().id
    }
}

impl<T, S> Lifecycle<T, S>
where
    T: DeserializeOwned + Send + 'static,
    S: StateSurface<T>,
{
    pub(crate) fn new(transport: Arc<dyn Transport>, url: String) -> Arc<Self> {
        let (state, _) = watch::channel(S::default());
        Arc::new(Self {
            instance: Uuid::new_v4(),
            transport,
            live: Mutex::new(Live {
                id: 0,
                url,
                token: CancellationToken::new(),
                session: 0,
                closed: false,
            }),
            state,
            started: AtomicU64::new(0),
            _data: PhantomData,
        })
    }

    /// Supersede the live attempt and fetch `url`. Returns the new attempt id,
    /// or `None` after teardown.
    pub(crate) fn start(self: &Arc<Self>, url: &str) -> Option<u64> {
        let mut live = self.lock_live();
        let (id, token) = self.supersede(&mut live, url)?;
        drop(live);
        self.spawn_attempt(id, token, url);
        Some(id)
    }

    /// Open a new polling session and fetch `url` as its first attempt.
    /// Schedules of earlier sessions can no longer start attempts. Returns
    /// the session generation, or `None` after teardown.
    pub(crate) fn start_session(self: &Arc<Self>, url: &str) -> Option<u64> {
        let mut live = self.lock_live();
        let (id, token) = self.supersede(&mut live, url)?;
        live.session += 1;
        let session = live.session;
        drop(live);
        self.spawn_attempt(id, token, url);
        Some(session)
    }

    /// Like [`start`](Self::start), but refused unless `session` is still
    /// the current one
    pub(crate) fn start_for_session(self: &Arc<Self>, url: &str, session: u64) -> Option<u64> {
        let mut live = self.lock_live();
        if live.session != session {
            trace!(instance = %self.instance, session, "ignoring tick of a cleared schedule");
            return None;
        }
        let (id, token) = self.supersede(&mut live, url)?;
        drop(live);
        self.spawn_attempt(id, token, url);
        Some(id)
    }

    fn supersede(&self, live: &mut Live, url: &str) -> Option<(u64, CancellationToken)> {
        if live.closed {
            trace!(instance = %self.instance, "ignoring start after teardown");
            return None;
        }
        live.token.cancel();
        live.id += 1;
        live.url = url.to_string();
        live.token = CancellationToken::new();
        self.state.send_modify(|s| s.begin());
        self.started.fetch_add(1, Ordering::Relaxed);
        Some((live.id, live.token.clone()))
    }

    fn spawn_attempt(self: &Arc<Self>, id: u64, token: CancellationToken, url: &str) {
        let span = debug_span!("fetch_attempt", instance = %self.instance, attempt = id, url);
        let this = Arc::clone(self);
        let url = url.to_string();
        tokio::spawn(
            async move {
                debug!("attempt started");
                let outcome = tokio::select! {
                    biased;
                    () = token.cancelled() => Err(FetchError::Cancelled),
                    result = this.fetch(&url, &token) => result,
                };
                this.settle(id, &token, outcome);
            }
            .instrument(span),
        );
    }

    /// Start a new attempt against the current url
    pub(crate) fn restart(self: &Arc<Self>) -> Option<u64> {
        let url = self.lock_live().url.clone();
        self.start(&url)
    }

    async fn fetch(&self, url: &str, token: &CancellationToken) -> Result<T, FetchError> {
        let response = self.transport.get(url, token).await?;
        if !response.is_success() {
            return Err(FetchError::Status(response.status));
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    fn settle(&self, id: u64, token: &CancellationToken, outcome: Result<T, FetchError>) {
        let live = self.lock_live();
        if live.id != id || token.is_cancelled() {
            trace!("discarding stale attempt outcome");
            return;
        }
        match outcome {
            Ok(data) => {
                debug!("attempt resolved");
                self.state.send_modify(|s| s.resolve(data));
            }
            Err(e) => {
                // the live token is intact, so even a Cancelled here is a failure
                warn!("attempt failed: {e}");
                self.state.send_modify(|s| s.reject(&e));
            }
        }
        drop(live);
    }

    pub(crate) fn snapshot(&self) -> S {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }
}

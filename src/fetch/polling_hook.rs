use super::lifecycle::Lifecycle;
use super::state::PollState;
use super::transport::Transport;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Fetches a url once, then again every `interval` until the parameters
/// change or the hook is dropped. A zero or absent interval means a single
/// fetch.
///
/// Each tick is an ordinary attempt and supersedes the previous one, so a slow
/// response never lands on top of a newer tick's result. Errors are exposed
/// as a flag only.
pub struct PollingHook<T> {
    core: Arc<Lifecycle<T, PollState<T>>>,
    url: String,
    interval: Option<Duration>,
    /// Cancelled whenever the parameters change; owns the timer task
    session: CancellationToken,
}

impl<T> PollingHook<T>
where
    T: DeserializeOwned + Default + Clone + Send + Sync + 'static,
{
    /// Mount the hook, start the first attempt and the timer if any.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime
    pub fn new(
        transport: Arc<dyn Transport>,
        url: impl Into<String>,
        interval: Option<Duration>,
    ) -> Self {
        let url = url.into();
        let core = Lifecycle::new(transport, url.clone());
        info!(instance = %core.instance(), url = %url, ?interval, "polling hook mounted");
        let session = Self::mount(&core, &url, interval);
        Self {
            core,
            url,
            interval,
            session,
        }
    }

    fn mount(
        core: &Arc<Lifecycle<T, PollState<T>>>,
        url: &str,
        interval: Option<Duration>,
    ) -> CancellationToken {
        let session = CancellationToken::new();
        let Some(generation) = core.start_session(url) else {
            return session;
        };

        if let Some(period) = interval.filter(|p| !p.is_zero()) {
            tokio::spawn(poll_loop(
                Arc::clone(core),
                url.to_string(),
                period,
                generation,
                session.clone(),
            ));
        }

        session
    }

    /// Replace url and interval. Unchanged parameters do nothing; otherwise
    /// the old schedule is cleared and a fresh attempt starts immediately.
    pub fn set_params(&mut self, url: impl Into<String>, interval: Option<Duration>) {
        let url = url.into();
        if url == self.url && interval == self.interval {
            return;
        }
        debug!(
            instance = %self.core.instance(),
            from = %self.url,
            to = %url,
            ?interval,
            "polling parameters changed"
        );
        self.session.cancel();
        self.url = url;
        self.interval = interval;
        self.session = Self::mount(&self.core, &self.url, self.interval);
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub const fn interval(&self) -> Option<Duration> {
        self.interval
    }

    #[must_use]
    pub fn state(&self) -> PollState<T> {
        self.core.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PollState<T>> {
        self.core.subscribe()
    }

    /// Attempts started since mount, timer ticks included
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.core.attempts()
    }
}

impl<T> Drop for PollingHook<T> {
    fn drop(&mut self) {
        self.session.cancel();
        self.core.teardown();
        info!(instance = %self.core.instance(), url = %self.url, "polling hook unmounted");
    }
}

async fn poll_loop<T>(
    core: Arc<Lifecycle<T, PollState<T>>>,
    url: String,
    period: Duration,
    generation: u64,
    session: CancellationToken,
) where
    T: DeserializeOwned + Default + Clone + Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = session.cancelled() => {
                debug!(instance = %core.instance(), "polling schedule cleared");
                break;
            }
            _ = ticker.tick() => {
                if core.start_for_session(&url, generation).is_none() {
                    break;
                }
            }
        }
    }
}

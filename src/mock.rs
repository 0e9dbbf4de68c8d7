/**
 * In-process mock endpoints.
 *
 * Intercepts urls by pattern and answers with canned or computed responses
 * after an artificial delay, so the fetch hooks can be exercised under
 * deterministic latency and failure without a network.
 */
use crate::config::{
    BROKEN_LATENCY_MS, BROKEN_PRODUCTS_PATH, FEATURED_LATENCY_MS, FEATURED_PRODUCTS_PATH,
    METRICS_LATENCY_MS, METRICS_PATH, PRODUCTS_LATENCY_MS, PRODUCTS_PATH,
};
use crate::data::{self, Metric};
use crate::fetch::{FetchError, Response, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

type ComputeFn = Box<dyn Fn(u64) -> Response + Send + Sync>;

enum Responder {
    Fixed(Response),
    /// Called with the 1-based hit number of the route
    Computed(ComputeFn),
}

struct MockRoute {
    pattern: String,
    latency: Duration,
    responder: Responder,
    hits: AtomicU64,
}

impl MockRoute {
    fn respond(&self, hit: u64) -> Response {
        match &self.responder {
            Responder::Fixed(response) => response.clone(),
            Responder::Computed(f) => f(hit),
        }
    }
}

#[derive(Default)]
pub struct MockTransport {
    routes: Vec<MockRoute>,
    fallback: Option<Arc<dyn Transport>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer urls matching `pattern` with a fixed status and body
    #[must_use]
    pub fn route(
        self,
        pattern: &str,
        latency: Duration,
        status: u16,
        body: impl Into<Bytes>,
    ) -> Self {
        self.push(pattern, latency, Responder::Fixed(Response::new(status, body)))
    }

    /// Answer urls matching `pattern` with `value` serialized as json
    ///
    /// # Errors
    ///
    /// Will return `Err` if `value` cannot be serialized
    pub fn route_json<B: Serialize>(
        self,
        pattern: &str,
        latency: Duration,
        value: &B,
    ) -> serde_json::Result<Self> {
        let body = serde_json::to_vec(value)?;
        Ok(self.route(pattern, latency, 200, body))
    }

    /// Answer urls matching `pattern` with a response built from the hit number
    #[must_use]
    pub fn route_with<F>(self, pattern: &str, latency: Duration, f: F) -> Self
    where
        F: Fn(u64) -> Response + Send + Sync + 'static,
    {
        self.push(pattern, latency, Responder::Computed(Box::new(f)))
    }

    /// Send unmatched urls to `transport` instead of answering 404
    #[must_use]
    pub fn with_fallback(mut self, transport: Arc<dyn Transport>) -> Self {
        self.fallback = Some(transport);
        self
    }

    fn push(mut self, pattern: &str, latency: Duration, responder: Responder) -> Self {
        self.routes.push(MockRoute {
            pattern: pattern.to_string(),
            latency,
            responder,
            hits: AtomicU64::new(0),
        });
        self
    }

    /// Requests that reached routes registered under `pattern`
    #[must_use]
    pub fn hits(&self, pattern: &str) -> u64 {
        self.routes
            .iter()
            .filter(|r| r.pattern == pattern)
            .map(|r| r.hits.load(Ordering::Relaxed))
            .sum()
    }

    /// The endpoints the demo front-end talks to
    ///
    /// # Errors
    ///
    /// Will return `Err` if the canned catalog cannot be serialized
    pub fn demo() -> serde_json::Result<Self> {
        Ok(Self::new()
            .route_json(
                FEATURED_PRODUCTS_PATH,
                Duration::from_millis(FEATURED_LATENCY_MS),
                &data::featured(),
            )?
            .route(
                BROKEN_PRODUCTS_PATH,
                Duration::from_millis(BROKEN_LATENCY_MS),
                500,
                "internal server error",
            )
            .route_json(
                PRODUCTS_PATH,
                Duration::from_millis(PRODUCTS_LATENCY_MS),
                &data::catalog(),
            )?
            .route_with(
                METRICS_PATH,
                Duration::from_millis(METRICS_LATENCY_MS),
                metrics_response,
            ))
    }

    fn pattern_matches(pattern: &str, url: &str) -> bool {
        if pattern == "*" || pattern == url {
            return true;
        }

        // "/api/*" matches "/api/products"
        if let Some(prefix) = pattern.strip_suffix('*') {
            return url.starts_with(prefix);
        }

        false
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<Response, FetchError> {
        let Some(route) = self
            .routes
            .iter()
            .find(|r| Self::pattern_matches(&r.pattern, url))
        else {
            return match &self.fallback {
                Some(fallback) => fallback.get(url, cancel).await,
                None => {
                    debug!(url, "no mock route");
                    Ok(Response::new(404, "not found"))
                }
            };
        };

        let hit = route.hits.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(url, pattern = %route.pattern, hit, "mock route hit");

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FetchError::Cancelled),
            () = sleep(route.latency) => Ok(route.respond(hit)),
        }
    }
}

/// Deterministic but moving numbers so each poll visibly changes
#[allow(clippy::cast_precision_loss)]
fn metrics_response(hit: u64) -> Response {
    let wobble = (hit * 37 % 23) as f64;
    let metrics = vec![
        Metric::new("active users", 120.0 + wobble * 3.0, ""),
        Metric::new("requests", 840.0 + wobble * 11.0, "req/min"),
        Metric::new("p95 latency", 95.0 + wobble * 1.5, "ms"),
        Metric::new("polls served", hit as f64, ""),
    ];
    match serde_json::to_vec(&metrics) {
        Ok(body) => Response::new(200, body),
        Err(e) => Response::new(500, e.to_string()),
    }
}

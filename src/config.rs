/**
 * Configuration constants for the fetch demo and its mock endpoints
 */
use std::time::Duration;

/// Path of the full product catalog
pub const PRODUCTS_PATH: &str = "/api/products";

/// Path of the short featured list
pub const FEATURED_PRODUCTS_PATH: &str = "/api/products/featured";

/// Path that always answers with a server error
pub const BROKEN_PRODUCTS_PATH: &str = "/api/products/broken";

/// Path of the polled metrics record
pub const METRICS_PATH: &str = "/api/metrics";

/// Simulated latency of the full catalog in milliseconds
pub const PRODUCTS_LATENCY_MS: u64 = 800;

/// Simulated latency of the featured list in milliseconds
pub const FEATURED_LATENCY_MS: u64 = 100;

/// Simulated latency of the failing endpoint in milliseconds
pub const BROKEN_LATENCY_MS: u64 = 300;

/// Simulated latency of the metrics endpoint in milliseconds
pub const METRICS_LATENCY_MS: u64 = 200;

/// Default polling period for the metrics view in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;

/// Interval presets cycled by the metrics view (0 = no polling)
pub const POLL_INTERVAL_PRESETS_MS: [u64; 4] = [0, 1000, 3000, 5000];

/// Redraw tick for the UI loop in milliseconds
pub const UI_TICK_MS: u64 = 250;

/// Capacity of the key event channel
pub const KEY_CHANNEL_CAPACITY: usize = 100;

/// Default log file (the terminal belongs to the UI)
pub const DEFAULT_LOG_FILE: &str = "fetchdeck.log";

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "fetchdeck=info";

/// Runtime configuration for the demo binary
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Base URL prepended to keys that start with `/` when a request reaches the network
    pub base_url: Option<String>,
    /// Serve the demo endpoints from the in-process mock
    pub use_mock: bool,
    /// Initial polling period of the metrics view
    pub poll_interval: Duration,
    pub log_file: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            use_mock: true,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

/// Validate configuration constants at compile time
const _: () = {
    assert!(PRODUCTS_LATENCY_MS > FEATURED_LATENCY_MS, "PRODUCTS_LATENCY_MS must exceed FEATURED_LATENCY_MS");
    assert!(DEFAULT_POLL_INTERVAL_MS > METRICS_LATENCY_MS, "DEFAULT_POLL_INTERVAL_MS must exceed METRICS_LATENCY_MS");
    assert!(POLL_INTERVAL_PRESETS_MS[0] == 0, "first interval preset must disable polling");
    assert!(UI_TICK_MS > 0, "UI_TICK_MS must be greater than 0");
    assert!(KEY_CHANNEL_CAPACITY > 0, "KEY_CHANNEL_CAPACITY must be greater than 0");
};

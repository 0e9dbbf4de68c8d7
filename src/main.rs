use clap::Parser;
use fetchdeck::config::{DEFAULT_LOG_FILE, DEFAULT_POLL_INTERVAL_MS, DemoConfig};
use fetchdeck::fetch::{HttpTransport, Transport};
use fetchdeck::logging::init_logging;
use fetchdeck::mock::MockTransport;
use fetchdeck::tui::ui_loop;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL for requests that reach the network
    #[arg(short, long)]
    base_url: Option<String>,

    /// Send every request to the network instead of the built-in mock endpoints
    #[arg(long)]
    no_mock: bool,

    /// Initial polling period of the metrics view (0 disables polling)
    #[arg(short, long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,

    /// File that receives the logs
    #[arg(short, long, default_value = DEFAULT_LOG_FILE)]
    log_file: String,
}

impl From<Args> for DemoConfig {
    fn from(args: Args) -> Self {
        Self {
            base_url: args.base_url,
            use_mock: !args.no_mock,
            poll_interval: Duration::from_millis(args.poll_interval_ms),
            log_file: args.log_file,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DemoConfig::from(Args::parse());
    init_logging(&config.log_file)?;
    info!(?config, "starting fetchdeck");

    let http = Arc::new(HttpTransport::new(config.base_url.as_deref())?);
    let transport: Arc<dyn Transport> = if config.use_mock {
        Arc::new(MockTransport::demo()?.with_fallback(http))
    } else {
        http
    };

    ui_loop::run(transport, &config).await?;
    Ok(())
}

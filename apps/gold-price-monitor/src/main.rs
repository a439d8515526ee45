//! Gold Price Monitor Binary
//!
//! Starts the price scheduler and the HTTP/WebSocket server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gold-price-monitor
//! ```
//!
//! # Environment Variables
//!
//! All optional.
//! - `GOLD_API_URL`: Spot price endpoint (default: goldprice.org dbXRates USD)
//! - `GOLD_API_KEY`: Feed API key; `demo_key`/`demo`/empty selects mock mode (default: demo_key)
//! - `GOLD_FETCH_TIMEOUT_SECS`: Upper bound on one fetch (default: 10)
//! - `GOLD_UPDATE_INTERVAL_SECS`: Delay between updates (default: 30)
//! - `GOLD_INITIAL_DELAY_SECS`: Delay before the first update (default: 5)
//! - `GOLD_FORCE_ENABLED`: Run updates outside market hours (default: false)
//! - `GOLD_MARKET_OPEN_HOUR` / `GOLD_MARKET_CLOSE_HOUR`: Trading window (default: 8 / 20)
//! - `GOLD_MONITOR_BROADCAST_CAPACITY`: Quote channel capacity (default: 64)
//! - `GOLD_MONITOR_HTTP_PORT`: HTTP port (default: 8080)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: true)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4318>)
//! - `OTEL_SERVICE_NAME`: Service name (default: gold-price-monitor)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use gold_price_monitor::application::ports::{
    PriceSourcePort, QuotePublisherPort, QuoteStorePort,
};
use gold_price_monitor::infrastructure::telemetry;
use gold_price_monitor::{
    AppState, BroadcastConfig, BroadcastHub, GoldPriceSource, HttpServer, MarketSchedule,
    MessageRouter, MonitorConfig, PriceCache, PriceQueryService, PriceScheduler, SchedulerConfig,
    ServiceInfo, TopicSubscriptions, WebSocketState, init_metrics,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "failed to install rustls crypto provider")?;

    load_dotenv();

    // Initialize telemetry (OpenTelemetry + tracing)
    let telemetry_guard = telemetry::init();

    tracing::info!(
        otel_exporting = telemetry_guard.is_exporting(),
        "Starting Gold Price Monitor"
    );

    // Initialize Prometheus metrics
    if let Err(e) = init_metrics() {
        tracing::warn!(error = %e, "Prometheus recorder not installed, /metrics disabled");
    }

    let config = MonitorConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // Price source, cache and broadcast hub
    let market = MarketSchedule::system(config.market.hours());
    let source: Arc<dyn PriceSourcePort> =
        Arc::new(GoldPriceSource::new(&config.feed, market.clone())?);
    let cache = Arc::new(PriceCache::new());
    let broadcast_hub = Arc::new(BroadcastHub::new(BroadcastConfig::from(config.broadcast)));

    // Scheduler
    let scheduler = Arc::new(PriceScheduler::new(
        SchedulerConfig::from(config.scheduler),
        source,
        Arc::clone(&cache) as Arc<dyn QuoteStorePort>,
        Arc::clone(&broadcast_hub) as Arc<dyn QuotePublisherPort>,
        market,
    ));

    // Query surface and WebSocket sessions
    let subscriptions = Arc::new(TopicSubscriptions::new());
    let query = Arc::new(PriceQueryService::new(
        ServiceInfo::default(),
        cache,
        Arc::clone(&scheduler),
        Arc::clone(&subscriptions),
    ));
    let websocket = Arc::new(WebSocketState::new(
        broadcast_hub,
        subscriptions,
        MessageRouter::gold_price(),
    ));

    let http_server = HttpServer::new(
        config.server.http_port,
        AppState { query, websocket },
        shutdown_token.clone(),
    );

    // Spawn scheduler
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_token.clone()));

    // Spawn HTTP server
    let server_shutdown = shutdown_token.clone();
    let server_task = tokio::spawn(async move {
        if let Err(e) = http_server.run().await {
            tracing::error!(error = %e, "HTTP server error");
            server_shutdown.cancel();
        }
    });

    tracing::info!("Gold price monitor ready");

    await_shutdown(shutdown_token).await;

    if tokio::time::timeout(SHUTDOWN_TIMEOUT, async {
        let _ = scheduler_task.await;
        let _ = server_task.await;
    })
    .await
    .is_err()
    {
        tracing::warn!("Graceful shutdown timed out");
    }

    tracing::info!("Gold price monitor stopped");
    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

/// Log the parsed configuration.
fn log_config(config: &MonitorConfig) {
    tracing::info!(
        mock_mode = config.feed.is_mock_mode(),
        interval_secs = config.scheduler.update_interval.as_secs(),
        initial_delay_secs = config.scheduler.initial_delay.as_secs(),
        force_enabled = config.scheduler.force_enabled,
        open_hour = config.market.open_hour,
        close_hour = config.market.close_hour,
        http_port = config.server.http_port,
        "Configuration loaded"
    );
    tracing::debug!(
        api_url = %config.feed.api_url,
        api_key = ?config.feed.api_key,
        fetch_timeout_secs = config.feed.fetch_timeout.as_secs(),
        "Price feed"
    );
}

/// Load .env file from any ancestor directory.
fn load_dotenv_from_ancestors() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM, SIGINT, or a fatal server error).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
        () = shutdown_token.cancelled() => {
            tracing::warn!("Server stopped, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}

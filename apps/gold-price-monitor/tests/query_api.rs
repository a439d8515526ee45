//! Query API Integration Tests
//!
//! Exercises the REST endpoints and probes over a real HTTP listener.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Timelike;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use gold_price_monitor::application::ports::{QuotePublisherPort, QuoteStorePort};
use gold_price_monitor::{
    AppState, BroadcastHub, FeedSettings, GoldPriceSource, HttpServer, MarketHours,
    MarketSchedule, MessageRouter, PriceCache, PriceQueryService, PriceScheduler,
    SchedulerConfig, ServiceInfo, TopicSubscriptions, WebSocketState, init_metrics,
};

struct TestServer {
    base_url: String,
    http: reqwest::Client,
    cancel: CancellationToken,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl TestServer {
    async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .unwrap()
    }

    async fn get_json(&self, path: &str) -> Value {
        self.get(path).await.json().await.unwrap()
    }

    async fn post_json(&self, path: &str) -> Value {
        self.http
            .post(format!("{}{path}", self.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }
}

/// Start a server on a random port backed by synthetic quotes.
async fn setup_test_server(force_enabled: bool, hours: MarketHours) -> TestServer {
    let market = MarketSchedule::system(hours);
    let source = Arc::new(GoldPriceSource::new(&FeedSettings::default(), market.clone()).unwrap());
    let cache = Arc::new(PriceCache::new());
    let hub = Arc::new(BroadcastHub::with_defaults());
    let subscriptions = Arc::new(TopicSubscriptions::new());

    let scheduler = Arc::new(PriceScheduler::new(
        SchedulerConfig {
            force_enabled,
            ..SchedulerConfig::default()
        },
        source,
        Arc::clone(&cache) as Arc<dyn QuoteStorePort>,
        Arc::clone(&hub) as Arc<dyn QuotePublisherPort>,
        market,
    ));
    let query = Arc::new(PriceQueryService::new(
        ServiceInfo::default(),
        cache,
        scheduler,
        Arc::clone(&subscriptions),
    ));
    let websocket = Arc::new(WebSocketState::new(
        hub,
        subscriptions,
        MessageRouter::gold_price(),
    ));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();

    tokio::spawn(
        HttpServer::new(addr.port(), AppState { query, websocket }, cancel.clone())
            .serve(listener),
    );

    TestServer {
        base_url: format!("http://{addr}"),
        http: reqwest::Client::new(),
        cancel,
    }
}

/// Forced updates, so results do not depend on the wall clock.
async fn forced_server() -> TestServer {
    setup_test_server(true, MarketHours::default()).await
}

#[tokio::test]
async fn test_current_price_before_first_update() {
    let server = forced_server().await;
    let json = server.get_json("/api/gold/current").await;

    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "no price data available yet");
    assert!(json.get("data").is_none());
    assert!(json["timestamp"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_refresh_populates_current_price() {
    let server = forced_server().await;

    let refreshed = server.post_json("/api/gold/refresh").await;
    assert_eq!(refreshed["success"], true);
    assert_eq!(
        refreshed["message"],
        "gold price refreshed and sent to 0 subscriber(s)"
    );
    assert_eq!(refreshed["data"]["source"], "MOCK");
    assert_eq!(refreshed["data"]["currency"], "USD");

    let current = server.get_json("/api/gold/current").await;
    assert_eq!(current["success"], true);
    assert_eq!(current["data"]["id"], refreshed["data"]["id"]);

    let price: Decimal = current["data"]["price"].as_str().unwrap().parse().unwrap();
    assert!(price >= Decimal::new(1950, 0) && price <= Decimal::new(2050, 0));
}

#[tokio::test]
async fn test_refresh_replaces_cached_quote() {
    let server = forced_server().await;

    let first = server.post_json("/api/gold/refresh").await;
    let second = server.post_json("/api/gold/refresh").await;
    assert_ne!(first["data"]["id"], second["data"]["id"]);

    let current = server.get_json("/api/gold/current").await;
    assert_eq!(current["data"]["id"], second["data"]["id"]);
}

#[tokio::test]
async fn test_refresh_outside_market_hours_is_suppressed() {
    // One-hour window twelve hours away from now
    let hour = chrono::Local::now().hour();
    let other = (hour + 12) % 24;
    let server = setup_test_server(false, MarketHours::new(other, other)).await;

    let json = server.post_json("/api/gold/refresh").await;
    assert_eq!(json["success"], true);
    assert!(json.get("data").is_none());

    let current = server.get_json("/api/gold/current").await;
    assert_eq!(current["success"], false);
}

#[tokio::test]
async fn test_status_and_health() {
    let server = forced_server().await;

    let status = server.get_json("/api/gold/status").await;
    assert_eq!(status["service"], "Gold Price Monitor");
    assert_eq!(status["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(status["status"], "running");
    assert_eq!(status["updateIntervalSeconds"], 30);
    assert_eq!(status["forceEnabled"], true);
    assert_eq!(status["mockMode"], true);
    assert_eq!(status["subscribers"], 0);
    assert!(status["marketOpen"].is_boolean());

    let health = server.get_json("/api/gold/health").await;
    assert_eq!(health, serde_json::json!({"status": "UP", "service": "Gold Price Monitor"}));
}

#[tokio::test]
async fn test_probes() {
    let server = forced_server().await;

    let live = server.get("/healthz").await;
    assert_eq!(live.status(), reqwest::StatusCode::OK);
    assert_eq!(live.text().await.unwrap(), "OK");

    let not_ready = server.get("/readyz").await;
    assert_eq!(not_ready.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

    server.post_json("/api/gold/refresh").await;

    let ready = server.get("/readyz").await;
    assert_eq!(ready.status(), reqwest::StatusCode::OK);
    assert_eq!(ready.text().await.unwrap(), "READY");
}

#[tokio::test]
async fn test_metrics_endpoint_renders_cycles() {
    init_metrics().unwrap();
    let server = forced_server().await;
    server.post_json("/api/gold/refresh").await;

    let response = server.get("/metrics").await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("gold_monitor_cycles_total"), "{body}");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = forced_server().await;
    let response = server.get("/api/gold/unknown").await;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

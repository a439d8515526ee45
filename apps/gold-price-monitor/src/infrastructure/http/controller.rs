//! HTTP Controller (Driver Adapter)
//!
//! Axum routes for the gold price query API, probes, Prometheus metrics and
//! the WebSocket upgrade. Handlers delegate to [`PriceQueryService`].

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use super::response::{PriceResponse, RefreshResponse};
use crate::application::services::{HealthReport, PriceQueryService, ServiceStatus};
use crate::infrastructure::metrics::get_metrics_handle;
use crate::infrastructure::websocket::{self, WebSocketState};

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Query surface over the cached quote.
    pub query: Arc<PriceQueryService>,
    /// WebSocket session state.
    pub websocket: Arc<WebSocketState>,
}

impl FromRef<AppState> for Arc<WebSocketState> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.websocket)
    }
}

/// Create the HTTP router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/gold/current", get(current_price))
        .route("/api/gold/refresh", post(refresh_price))
        .route("/api/gold/status", get(service_status))
        .route("/api/gold/health", get(service_health))
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .route("/ws/gold-price", get(websocket::upgrade_handler))
        .with_state(state)
}

async fn current_price(State(state): State<AppState>) -> Json<PriceResponse> {
    let quote = state.query.current_price();
    Json(PriceResponse::from_cached(quote.as_deref()))
}

async fn refresh_price(State(state): State<AppState>) -> impl IntoResponse {
    let response = match state.query.refresh().await {
        Ok(outcome) => RefreshResponse::from_outcome(&outcome),
        Err(e) => {
            tracing::error!(error = %e, "Manual price refresh failed");
            RefreshResponse::failed(&e)
        }
    };

    (StatusCode::OK, Json(response))
}

async fn service_status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(state.query.status())
}

async fn service_health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.query.health())
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.query.current_price().is_some() {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::application::ports::{
        Clock, MockClock, PriceSourcePort, QuotePublisherPort, QuoteStorePort,
    };
    use crate::application::services::{
        MarketSchedule, PriceScheduler, SchedulerConfig, ServiceInfo,
    };
    use crate::domain::market_hours::MarketHours;
    use crate::domain::quote::{MarketStatus, Quote, QuoteSource};
    use crate::domain::subscription::TopicSubscriptions;
    use crate::infrastructure::broadcast::BroadcastHub;
    use crate::infrastructure::cache::PriceCache;
    use crate::infrastructure::websocket::MessageRouter;

    struct FixedSource;

    #[async_trait]
    impl PriceSourcePort for FixedSource {
        async fn fetch(&self) -> Quote {
            Quote::new(
                Decimal::new(202_500, 2),
                "USD",
                Decimal::new(500, 2),
                Decimal::new(25, 2),
                QuoteSource::Mock,
                MarketStatus::Open,
            )
        }

        fn is_mock_mode(&self) -> bool {
            true
        }
    }

    /// Router over a market that is open on a Tuesday at noon.
    fn test_router() -> Router {
        let now = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let mut clock = MockClock::new();
        clock.expect_now_local().return_const(now);
        let clock: Arc<dyn Clock> = Arc::new(clock);

        let cache = Arc::new(PriceCache::new());
        let hub = Arc::new(BroadcastHub::with_defaults());
        let subscriptions = Arc::new(TopicSubscriptions::new());
        let scheduler = Arc::new(PriceScheduler::new(
            SchedulerConfig::default(),
            Arc::new(FixedSource),
            cache.clone() as Arc<dyn QuoteStorePort>,
            hub.clone() as Arc<dyn QuotePublisherPort>,
            MarketSchedule::new(MarketHours::default(), clock),
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

        create_router(AppState { query, websocket })
    }

    async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, String) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send_json(router: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let (status, body) = send(router, method, uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    #[tokio::test]
    async fn current_price_before_first_cycle() {
        let router = test_router();
        let (status, json) = send_json(&router, "GET", "/api/gold/current").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "no price data available yet");
    }

    #[tokio::test]
    async fn refresh_then_current_price() {
        let router = test_router();

        let (status, refreshed) = send_json(&router, "POST", "/api/gold/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(refreshed["success"], true);
        assert_eq!(refreshed["data"]["price"], "2025.00");

        let (_, current) = send_json(&router, "GET", "/api/gold/current").await;
        assert_eq!(current["success"], true);
        assert_eq!(current["data"]["id"], refreshed["data"]["id"]);
    }

    #[tokio::test]
    async fn status_reports_scheduler_state() {
        let router = test_router();
        let (status, json) = send_json(&router, "GET", "/api/gold/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["service"], "Gold Price Monitor");
        assert_eq!(json["status"], "running");
        assert_eq!(json["marketOpen"], true);
        assert_eq!(json["updateIntervalSeconds"], 30);
        assert_eq!(json["mockMode"], true);
        assert_eq!(json["subscribers"], 0);
    }

    #[tokio::test]
    async fn health_is_constant() {
        let router = test_router();
        let (_, json) = send_json(&router, "GET", "/api/gold/health").await;
        assert_eq!(json["status"], "UP");
        assert_eq!(json["service"], "Gold Price Monitor");
    }

    #[tokio::test]
    async fn readiness_follows_cache() {
        let router = test_router();
        assert_eq!(
            send(&router, "GET", "/readyz").await,
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY".to_string())
        );

        send(&router, "POST", "/api/gold/refresh").await;
        assert_eq!(
            send(&router, "GET", "/readyz").await,
            (StatusCode::OK, "READY".to_string())
        );
    }

    #[tokio::test]
    async fn liveness_is_ok() {
        let router = test_router();
        assert_eq!(
            send(&router, "GET", "/healthz").await,
            (StatusCode::OK, "OK".to_string())
        );
    }

    #[tokio::test]
    async fn refresh_requires_post() {
        let router = test_router();
        let (status, _) = send(&router, "GET", "/api/gold/refresh").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}

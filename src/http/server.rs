//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health and query handlers
//! - Wire up middleware (tracing, request ID, timeout, body limit)
//! - Bind server to listener
//! - Run the idle origin-bucket sweeper alongside the server
//! - Drain gracefully on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::gateway::{Gateway, GatewayError, QueryRequest, QueryResponse};
use crate::http::request;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

/// HTTP server for the prompt gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    gateway: Arc<Gateway>,
}

impl HttpServer {
    /// Create a new HTTP server around an already built gateway.
    ///
    /// `config` is expected to have passed
    /// [`validate_config`](crate::config::validation::validate_config);
    /// [`load_startup_config`](crate::config::load_startup_config) does this.
    pub fn new(config: GatewayConfig, gateway: Arc<Gateway>) -> Self {
        let state = AppState {
            gateway: gateway.clone(),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            gateway,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/query", post(query_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// The router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = self.gateway.backend_name(),
            "HTTP server starting"
        );

        let sweeper = tokio::spawn(sweep_origins(
            self.gateway.clone(),
            Duration::from_secs(self.config.rate_limit.sweep_interval_secs),
            Duration::from_secs(self.config.rate_limit.origin_idle_ttl_secs),
            shutdown.resubscribe(),
        ));

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        sweeper.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Shortest sweep period; a zero interval is raised to this.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically evict idle origin buckets.
async fn sweep_origins(
    gateway: Arc<Gateway>,
    interval: Duration,
    idle_ttl: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval.max(MIN_SWEEP_INTERVAL));
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                gateway.sweep_origins(idle_ttl);
            }
            _ = shutdown.recv() => {
                tracing::debug!("Origin sweeper exiting");
                break;
            }
        }
    }
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn query_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, GatewayError> {
    let origin = request::origin(peer);
    state
        .gateway
        .handle(origin, request::api_key(&headers), payload)
        .await
        .map(Json)
}

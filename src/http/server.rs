//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the asset handler on every path
//! - Wire up middleware (timeout, request ID, tracing)
//! - Map resolution outcomes to responses, telemetry and log records
//! - Graceful shutdown on `Shutdown` or OS signal

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{request::Parts, Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::assets::{AssetRequest, AssetResolver, Encoding, ImportFallbackCache, Outcome, ResolvedAsset};
use crate::config::{ServerConfig, ValidationError};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response::{internal_error, not_found, serve_asset};
use crate::lifecycle::{shutdown_signal, ShutdownSignal};
use crate::observability::{MetricsSink, NoopSink, Signal, TelemetrySink};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<AssetResolver>,
    pub telemetry: Arc<dyn TelemetrySink>,
}

/// HTTP server for the asset pipeline.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    cache: ImportFallbackCache,
}

impl HttpServer {
    /// Create a server with a fresh import cache and the telemetry sink the
    /// configuration asks for.
    pub fn new(config: ServerConfig) -> Result<Self, ValidationError> {
        let telemetry: Arc<dyn TelemetrySink> = if config.observability.telemetry_disabled {
            Arc::new(NoopSink)
        } else {
            Arc::new(MetricsSink)
        };
        Self::with_collaborators(config, ImportFallbackCache::new(), telemetry)
    }

    /// Create a server around caller-owned collaborators.
    pub fn with_collaborators(
        config: ServerConfig,
        cache: ImportFallbackCache,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Result<Self, ValidationError> {
        let resolver = Arc::new(AssetResolver::from_config(&config, cache.clone())?);
        let state = AppState {
            resolver,
            telemetry,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            cache,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(serve_handler))
            .route("/{*path}", any(serve_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// Router with every layer applied, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn import_cache(&self) -> &ImportFallbackCache {
        &self.cache
    }

    /// Serve until `shutdown` fires or the process receives SIGINT/SIGTERM.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.stopped() => tracing::info!("Shutdown requested"),
                    _ = shutdown_signal() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve the request path and answer with the asset, a 404 or a 500.
#[tracing::instrument(
    name = "serve_asset",
    skip_all,
    fields(path = %request.uri().path(), request_id = %request.request_id())
)]
async fn serve_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request.request_id().to_string();
    let (parts, _) = request.into_parts();
    let asset_request = AssetRequest::new(parts.uri.path(), &parts.headers);
    let path = asset_request.path.as_str();

    let response = match state.resolver.resolve(&asset_request).await {
        Ok(Outcome::Served(asset)) => deliver(&state, &parts, &asset, Signal::Served, path).await,
        Ok(Outcome::FallbackServed(asset)) => {
            deliver(&state, &parts, &asset, Signal::Fallback, path).await
        }
        Ok(Outcome::NotFound) | Ok(Outcome::Rejected) => {
            state.telemetry.record(Signal::NotFound, path);
            not_found()
        }
        Err(e) => {
            state.telemetry.record(Signal::Error, path);
            tracing::error!(
                request_id = %request_id,
                path = %path,
                status = StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                file = %e.path().display(),
                error = %e,
                "Asset lookup failed"
            );
            internal_error()
        }
    };

    let status = response.status();
    if !status.is_server_error() {
        tracing::info!(
            request_id = %request_id,
            path = %path,
            status = status.as_u16(),
            "Request completed"
        );
    }
    response
}

/// Stream a resolved asset and record the signal matching what the client
/// actually received.
async fn deliver(
    state: &AppState,
    parts: &Parts,
    asset: &ResolvedAsset,
    success: Signal,
    path: &str,
) -> Response {
    let response = serve_asset(parts, asset, state.resolver.header_policy()).await;
    let status = response.status();
    let telemetry = state.telemetry.as_ref();

    if status == StatusCode::NOT_FOUND {
        telemetry.record(Signal::NotFound, path);
    } else if status.is_server_error() {
        telemetry.record(Signal::Error, path);
        tracing::error!(
            path = %path,
            status = status.as_u16(),
            file = %asset.file_path.display(),
            "Asset could not be streamed"
        );
    } else {
        telemetry.record(success, path);
        match asset.encoding {
            Some(Encoding::Brotli) => telemetry.record(Signal::BrotliServed, path),
            Some(Encoding::Gzip) => telemetry.record(Signal::GzipServed, path),
            None => {}
        }
    }

    response
}

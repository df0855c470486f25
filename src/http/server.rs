//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with one wildcard route per mount
//! - Restrict each mount to its configured methods
//! - Wire up middleware (tracing spans with request IDs)
//! - Bind server to listener with graceful shutdown
//! - Forward requests to the mount's upstream and relay the response

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::on,
    Router,
};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::{validate_config, ConfigError, ProxyConfig};
use crate::error::ProxyError;
use crate::http::request::{build_upstream_request, method_allows_body};
use crate::http::response::relay_response;
use crate::lifecycle::shutdown_signal;
use crate::observability::tracing::make_request_span;
use crate::resilience::with_deadline;
use crate::routing::{Mount, PathSegments};

/// Outbound client shared by every mount. Speaks http and https, never
/// follows redirects.
pub type UpstreamClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Per-mount state injected into the forwarding handler.
#[derive(Clone)]
pub struct MountState {
    pub mount: Arc<Mount>,
    pub client: UpstreamClient,
    pub upstream_timeout: Option<Duration>,
    pub max_body_bytes: usize,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    mounts: Vec<Arc<Mount>>,
}

impl HttpServer {
    /// Validate the configuration and resolve every mount against the
    /// process environment.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let mounts = config
            .mounts
            .iter()
            .map(Mount::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::with_mounts(config, mounts))
    }

    /// Create a server from already-resolved mounts.
    pub fn with_mounts(config: ProxyConfig, mounts: Vec<Mount>) -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);
        let mounts: Vec<Arc<Mount>> = mounts.into_iter().map(Arc::new).collect();
        let router = Self::build_router(&config, &mounts, client);

        Self {
            router,
            config,
            mounts,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, mounts: &[Arc<Mount>], client: UpstreamClient) -> Router {
        let upstream_timeout = config.upstream.timeout_secs.map(Duration::from_secs);
        let mut router = Router::new();

        for mount in mounts {
            let Some(filter) = mount.method_filter() else {
                tracing::warn!(mount = %mount.name, "Mount has no routable methods, skipping");
                continue;
            };

            tracing::info!(
                mount = %mount.name,
                prefix = %mount.prefix,
                upstream = %mount.upstream,
                methods = ?mount.methods,
                "Mount registered"
            );

            let state = MountState {
                mount: mount.clone(),
                client: client.clone(),
                upstream_timeout,
                max_body_bytes: config.limits.max_body_bytes,
            };
            router = router.route(
                &mount.route_pattern(),
                on(filter, forward_request).with_state(state),
            );
        }

        router.layer(TraceLayer::new_for_http().make_span_with(make_request_span))
    }

    /// The assembled router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve on `listener` until a signal or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, mounts = self.mounts.len(), "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forward one request to the mount's upstream and relay the answer.
///
/// Any upstream status, 3xx included, is a normal result. Only failures to
/// obtain a response become errors.
async fn forward_request(
    State(state): State<MountState>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let mount = &state.mount;
    let segments = PathSegments::from_request_path(&mount.prefix, request.uri().path())
        .ok_or_else(|| ProxyError::InvalidTarget(request.uri().path().to_string()))?;

    let (parts, body) = request.into_parts();
    let body = if method_allows_body(&parts.method) {
        let bytes = axum::body::to_bytes(body, state.max_body_bytes)
            .await
            .map_err(|e| ProxyError::from_body_error(e, state.max_body_bytes))?;
        Some(bytes)
    } else {
        None
    };

    let outbound = build_upstream_request(mount, &segments, &parts, body)?;
    tracing::debug!(
        mount = %mount.name,
        method = %parts.method,
        target = %outbound.uri(),
        "Forwarding request"
    );

    let upstream: Response<Incoming> =
        with_deadline(state.upstream_timeout, state.client.request(outbound)).await?;
    tracing::debug!(mount = %mount.name, status = %upstream.status(), "Upstream responded");

    Ok(relay_response(upstream, &mount.marker))
}

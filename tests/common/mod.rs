//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;

use skinzai_proxy::{HttpServer, Mount, ProxyConfig, Shutdown};

/// A request as seen by the mock upstream.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    /// Path and query.
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Log of every request the mock upstream received.
#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Captured>>>);

#[allow(dead_code)]
impl Recorder {
    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn last(&self) -> Captured {
        self.0.lock().unwrap().last().cloned().expect("upstream saw no request")
    }
}

/// Start a mock upstream on an ephemeral port.
///
/// Behavior by path:
/// - `GET /v1/claims`: 200 with `{"claims":[]}`
/// - `DELETE /v1/claims/CL-1`: 302 to `/v1/claims`
/// - `/status/{code}`: that status with body `status {code}`
/// - `/marker`: 200 carrying its own `x-proxied-by`
/// - `/slow`: 200 after two seconds
/// - anything else: 200 echoing the request body and content type
pub async fn start_upstream() -> (SocketAddr, Recorder) {
    let recorder = Recorder::default();
    let app = Router::new()
        .fallback(upstream_handler)
        .with_state(recorder.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, recorder)
}

async fn upstream_handler(State(recorder): State<Recorder>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    recorder.0.lock().unwrap().push(Captured {
        method: parts.method.clone(),
        uri: parts.uri.to_string(),
        headers: parts.headers.clone(),
        body: body.clone(),
    });

    let path = parts.uri.path();
    if let Some(code) = path.strip_prefix("/status/") {
        let status = StatusCode::from_u16(code.parse().unwrap()).unwrap();
        return (status, format!("status {code}")).into_response();
    }

    match (parts.method.clone(), path) {
        (Method::GET, "/v1/claims") => (
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"claims":[]}"#,
        )
            .into_response(),
        (Method::DELETE, "/v1/claims/CL-1") => (
            StatusCode::FOUND,
            [(header::LOCATION, "/v1/claims")],
        )
            .into_response(),
        (_, "/marker") => ([("x-proxied-by", "upstream")], "marked").into_response(),
        (_, "/slow") => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            "slow".into_response()
        }
        _ => {
            let mut response = Response::new(Body::from(body));
            if let Some(content_type) = parts.headers.get(header::CONTENT_TYPE) {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, content_type.clone());
            }
            response
        }
    }
}

/// Start the proxy with both default mounts pointed at the given upstreams.
#[allow(dead_code)]
pub async fn start_proxy(api_url: &str, ml_url: &str) -> (SocketAddr, Shutdown) {
    start_proxy_with(ProxyConfig::default(), api_url, ml_url).await
}

/// Start the proxy with a custom config; `API_URL` and `ML_URL` resolve to
/// the given upstreams.
pub async fn start_proxy_with(
    config: ProxyConfig,
    api_url: &str,
    ml_url: &str,
) -> (SocketAddr, Shutdown) {
    let mounts = config
        .mounts
        .iter()
        .map(|m| {
            Mount::resolve_with(m, |key| match key {
                "API_URL" => Some(api_url.to_string()),
                "ML_URL" => Some(ml_url.to_string()),
                _ => None,
            })
            .unwrap()
        })
        .collect();
    let server = HttpServer::with_mounts(config, mounts);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

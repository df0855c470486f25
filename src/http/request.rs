//! Request handling and transformation.
//!
//! # Responsibilities
//! - Build the upstream target URL from the mount, path segments and query
//! - Filter inbound headers before forwarding
//! - Decide whether the method carries a body
//! - Assemble the outbound request
//!
//! # Design Decisions
//! - Pure and stateless: the same inbound request always maps to the same
//!   outbound request
//! - Only host, connection and content-length are dropped; the client
//!   recomputes them for the new connection
//! - Header names are compared lower-cased

use axum::body::{Body, Bytes};
use axum::http::{header, request::Parts, HeaderMap, Method, Request, Uri};

use crate::error::ProxyError;
use crate::routing::{Mount, PathSegments};

/// Inbound headers never copied onto the outbound request.
pub const EXCLUDED_REQUEST_HEADERS: [&str; 3] = ["host", "connection", "content-length"];

/// Build `{base}/{segments}{?query}`.
///
/// The base is used as configured. The query is appended only when it is
/// non-empty, so a bare trailing `?` on the inbound URL is dropped.
pub fn target_url(base: &str, segments: &PathSegments, query: Option<&str>) -> String {
    let mut target = format!("{}/{}", base, segments.joined());
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    target
}

/// Whether a header is stripped before forwarding.
pub fn is_excluded(name: &str) -> bool {
    EXCLUDED_REQUEST_HEADERS
        .iter()
        .any(|excluded| name.eq_ignore_ascii_case(excluded))
}

/// Copy every forwardable header, keeping repeated values in order.
pub fn forward_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound.iter() {
        if !is_excluded(name.as_str()) {
            outbound.append(name.clone(), value.clone());
        }
    }

    // Credentials always travel with the request.
    if let Some(auth) = inbound.get(header::AUTHORIZATION) {
        outbound.insert(header::AUTHORIZATION, auth.clone());
    }

    outbound
}

/// GET and HEAD are forwarded without a body.
pub fn method_allows_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}

/// Assemble the request sent to the mount's upstream.
///
/// `body` is ignored for methods that do not carry one. For the others the
/// bytes are sent unmodified, including an empty body.
pub fn build_upstream_request(
    mount: &Mount,
    segments: &PathSegments,
    parts: &Parts,
    body: Option<Bytes>,
) -> Result<Request<Body>, ProxyError> {
    let target = target_url(&mount.upstream, segments, parts.uri.query());
    let uri: Uri = target
        .parse()
        .map_err(|_| ProxyError::InvalidTarget(target.clone()))?;

    let body = if method_allows_body(&parts.method) {
        Body::from(body.unwrap_or_default())
    } else {
        Body::empty()
    };

    let mut request = Request::builder()
        .method(parts.method.clone())
        .uri(uri)
        .body(body)?;
    *request.headers_mut() = forward_headers(&parts.headers);

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MountConfig;
    use axum::http::{HeaderName, HeaderValue};

    fn segments(parts: &[&str]) -> PathSegments {
        parts.iter().copied().collect()
    }

    fn api_mount() -> Mount {
        Mount::resolve_with(&MountConfig::api(), |_| None).unwrap()
    }

    fn inbound(method: Method, uri: &str) -> Parts {
        let (parts, _) = Request::builder()
            .method(method)
            .uri(uri)
            .header("Host", "app.example.com")
            .header("Connection", "keep-alive")
            .header("Content-Length", "17")
            .header("Authorization", "Bearer X")
            .header("X-Trace", "abc")
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_target_url() {
        let base = "http://localhost:8000";
        let ab = segments(&["a", "b"]);

        assert_eq!(target_url(base, &ab, None), "http://localhost:8000/a/b");
        assert_eq!(target_url(base, &ab, Some("")), "http://localhost:8000/a/b");
        assert_eq!(
            target_url(base, &ab, Some("x=1&y=%20")),
            "http://localhost:8000/a/b?x=1&y=%20"
        );
        assert_eq!(
            target_url("http://api:9000/v2", &segments(&["claims"]), Some("status=open")),
            "http://api:9000/v2/claims?status=open"
        );
    }

    #[test]
    fn test_header_exclusion_any_case() {
        let mut headers = HeaderMap::new();
        for (name, value) in [("HOST", "proxy.local"), ("Connection", "close"), ("content-LENGTH", "42")] {
            headers.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_static(value),
            );
        }
        headers.insert("accept", HeaderValue::from_static("application/json"));
        headers.insert("x-custom", HeaderValue::from_static("1"));

        let out = forward_headers(&headers);

        assert!(!out.contains_key(header::HOST));
        assert!(!out.contains_key(header::CONNECTION));
        assert!(!out.contains_key(header::CONTENT_LENGTH));
        assert_eq!(out.get(header::ACCEPT).unwrap(), "application/json");
        assert_eq!(out.get("x-custom").unwrap(), "1");
        assert_eq!(out.len(), 2);

        assert!(is_excluded("Content-Length"));
        assert!(!is_excluded("transfer-encoding"));
    }

    #[test]
    fn test_repeated_headers_kept_in_order() {
        let mut headers = HeaderMap::new();
        headers.append("accept-language", HeaderValue::from_static("en"));
        headers.append("accept-language", HeaderValue::from_static("fr"));

        let out = forward_headers(&headers);
        let values: Vec<_> = out.get_all("accept-language").iter().collect();
        assert_eq!(values, vec!["en", "fr"]);
    }

    #[test]
    fn test_authorization_passes_through() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer X"));

        let out = forward_headers(&headers);
        assert_eq!(out.get(header::AUTHORIZATION).unwrap(), "Bearer X");
        assert_eq!(out.get_all(header::AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn test_method_allows_body() {
        assert!(!method_allows_body(&Method::GET));
        assert!(!method_allows_body(&Method::HEAD));
        for method in [Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            assert!(method_allows_body(&method), "{method}");
        }
    }

    #[tokio::test]
    async fn test_build_get_drops_body() {
        let parts = inbound(Method::GET, "/api/proxy/v1/claims?status=open");
        let request = build_upstream_request(
            &api_mount(),
            &segments(&["v1", "claims"]),
            &parts,
            Some(Bytes::from_static(b"ignored")),
        )
        .unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(
            request.uri().to_string(),
            "http://localhost:8000/v1/claims?status=open"
        );
        assert!(!request.headers().contains_key(header::HOST));
        assert!(!request.headers().contains_key(header::CONTENT_LENGTH));
        assert_eq!(request.headers().get(header::AUTHORIZATION).unwrap(), "Bearer X");
        assert_eq!(request.headers().get("x-trace").unwrap(), "abc");

        let body = axum::body::to_bytes(request.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_build_post_keeps_body_bytes() {
        let payload = Bytes::from_static(b"{\"id\":\"CL-1\"}");
        let parts = inbound(Method::POST, "/api/proxy/v1/claims");
        let request = build_upstream_request(
            &api_mount(),
            &segments(&["v1", "claims"]),
            &parts,
            Some(payload.clone()),
        )
        .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.uri().to_string(), "http://localhost:8000/v1/claims");
        assert!(!request.headers().contains_key(header::CONTENT_LENGTH));

        let body = axum::body::to_bytes(request.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, payload);
    }

    #[tokio::test]
    async fn test_build_delete_with_binary_and_empty_bodies() {
        let binary = Bytes::from(vec![0u8, 159, 146, 150, 255, 0, 10]);
        let parts = inbound(Method::DELETE, "/api/proxy/v1/claims/CL-1");
        let seg = segments(&["v1", "claims", "CL-1"]);

        let request = build_upstream_request(&api_mount(), &seg, &parts, Some(binary.clone())).unwrap();
        let body = axum::body::to_bytes(request.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, binary);

        let request = build_upstream_request(&api_mount(), &seg, &parts, Some(Bytes::new())).unwrap();
        let body = axum::body::to_bytes(request.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_invalid_target_is_reported() {
        let mut mount = api_mount();
        mount.upstream = "http://bad host".into();
        let parts = inbound(Method::GET, "/api/proxy/a");

        let err = build_upstream_request(&mount, &segments(&["a"]), &parts, None).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidTarget(_)));
    }
}

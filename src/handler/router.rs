//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, CORS, then
//! the API surface or the bundled frontend.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::api;
use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub range_header: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        let header_str = move |name: header::HeaderName| {
            req.headers().get(name).and_then(|v| v.to_str().ok())
        };

        Self {
            path: req.uri().path(),
            query: req.uri().query(),
            is_head: req.method() == Method::HEAD,
            if_none_match: header_str(header::IF_NONE_MATCH),
            range_header: header_str(header::RANGE),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Generic over the request body: routing only looks at the head, so the
/// server passes `Incoming` and tests pass `()`.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();

    // Origin is only of interest while CORS is enabled (development mode)
    let origin = state
        .cors
        .as_ref()
        .and_then(|cors| cors.allowed_origin(req.headers()));

    let mut response = route_request(&req, &state, origin).await;

    if let (Some(cors), Some(origin)) = (state.cors.as_ref(), origin) {
        if !response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        {
            cors.apply(origin, response.headers_mut());
        }
    }

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(header::SERVER, server);
    }

    logger::log_request(
        req.method().as_str(),
        req.uri().path(),
        response.status().as_u16(),
    );
    if state.access_log_enabled() {
        log_access(&req, &response, &state, peer_addr, origin, started);
    }

    Ok(response)
}

async fn route_request<B>(
    req: &Request<B>,
    state: &AppState,
    origin: Option<&str>,
) -> Response<Full<Bytes>> {
    // 1. Preflight, or a plain OPTIONS
    if req.method() == Method::OPTIONS {
        return match (state.cors.as_ref(), origin) {
            (Some(cors), Some(origin)) => cors.preflight(origin, req.headers()),
            _ => http::build_options_response(),
        };
    }

    // 2. Only read-only methods are served
    if let Some(resp) = check_http_method(req.method()) {
        return resp;
    }

    // 3. Body size
    if let Some(resp) = check_body_size(req, state.config.http.max_body_size) {
        return resp;
    }

    let ctx = RequestContext::from_request(req);

    // 4-5. Status endpoint and routers
    if api::is_api_path(ctx.path) {
        return api::dispatch(ctx.path, ctx.query, state).await;
    }

    // 6. Frontend bundle (production only)
    if let Some(frontend) = state.frontend.as_ref() {
        return static_files::serve_frontend(&ctx, frontend).await;
    }

    // 7. Development: the frontend runs elsewhere
    http::build_404_response()
}

/// Reject methods other than GET/HEAD (OPTIONS is answered earlier)
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(header::CONTENT_LENGTH)?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };

    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    state: &AppState,
    peer_addr: SocketAddr,
    origin: Option<&str>,
    started: Instant,
) {
    let header_string = |name: header::HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_string(header::REFERER);
    entry.user_agent = header_string(header::USER_AGENT);
    entry.origin = origin.map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, FrontendConfig};
    use crate::services::{testing, Services};
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    const PEER: ([u8; 4], u16) = ([127, 0, 0, 1], 50000);

    fn build_state(development: bool, frontend_dir: Option<&std::path::Path>) -> Arc<AppState> {
        let mut config = Config::default();
        config.app.testing = true;
        config.app.development = development;
        config.logging.access_log = false;
        if let Some(dir) = frontend_dir {
            config.frontend = FrontendConfig {
                dir: dir.to_string_lossy().into_owned(),
                ..FrontendConfig::default()
            };
        }
        Arc::new(AppState::with_services(config, testing::services()))
    }

    fn frontend_fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>app</html>").unwrap();
        std::fs::write(dir.path().join("favicon.ico"), [0u8, 1, 2, 3]).unwrap();
        std::fs::create_dir(dir.path().join("js")).unwrap();
        std::fs::write(dir.path().join("js/main.js"), "console.log(1)").unwrap();
        dir
    }

    fn request(method: Method, uri: &str) -> hyper::http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    async fn send(state: &Arc<AppState>, req: Request<()>) -> Response<Full<Bytes>> {
        handle_request(req, Arc::clone(state), SocketAddr::from(PEER))
            .await
            .unwrap()
    }

    async fn body(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_status_is_empty_200() {
        let state = build_state(false, None);
        let resp = send(&state, request(Method::GET, "/api/status").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_status_without_services() {
        let mut config = Config::default();
        config.app.testing = true;
        let state = Arc::new(AppState::with_services(config, Services::default()));
        let resp = send(&state, request(Method::GET, "/api/status").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_404_in_both_modes() {
        let dir = frontend_fixture();
        for state in [build_state(true, None), build_state(false, Some(dir.path()))] {
            let resp = send(&state, request(Method::GET, "/api/nope").body(()).unwrap()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            assert_eq!(&body(resp).await[..], br#"{"detail":"Not Found"}"#);
        }
    }

    #[tokio::test]
    async fn test_search_through_router() {
        let state = build_state(true, None);
        let resp = send(
            &state,
            request(Method::GET, "/api/search?q=ownership").body(()).unwrap(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body(resp).await).unwrap();
        assert_eq!(json["results"][0]["id"], "d2");
    }

    #[tokio::test]
    async fn test_spa_fallback_in_production() {
        let dir = frontend_fixture();
        let state = build_state(false, Some(dir.path()));

        for path in ["/", "/results/42", "/settings?tab=1"] {
            let resp = send(&state, request(Method::GET, path).body(()).unwrap()).await;
            assert_eq!(resp.status(), StatusCode::OK, "{path}");
            assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
            assert_eq!(body(resp).await, "<html>app</html>");
        }
    }

    #[tokio::test]
    async fn test_root_file_and_mount_in_production() {
        let dir = frontend_fixture();
        let state = build_state(false, Some(dir.path()));

        let resp = send(&state, request(Method::GET, "/favicon.ico").body(()).unwrap()).await;
        assert_eq!(resp.headers()["content-type"], "image/x-icon");
        assert_eq!(&body(resp).await[..], &[0u8, 1, 2, 3]);

        let resp = send(&state, request(Method::GET, "/static/js/main.js").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "application/javascript");

        let resp = send(&state, request(Method::GET, "/static/js/missing.js").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_development_serves_no_frontend() {
        let state = build_state(true, None);
        for path in ["/", "/favicon.ico", "/static/js/main.js"] {
            let resp = send(&state, request(Method::GET, path).body(()).unwrap()).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn test_cors_headers_for_allowed_origin() {
        let state = build_state(true, None);
        let req = request(Method::GET, "/api/status")
            .header("Origin", "http://localhost:3000")
            .body(())
            .unwrap();
        let resp = send(&state, req).await;
        assert_eq!(
            resp.headers()["access-control-allow-origin"],
            "http://localhost:3000"
        );
        assert_eq!(resp.headers()["access-control-allow-credentials"], "true");
    }

    #[tokio::test]
    async fn test_no_cors_for_other_origin_or_production() {
        let dir = frontend_fixture();
        for state in [build_state(true, None), build_state(false, Some(dir.path()))] {
            let req = request(Method::GET, "/api/status")
                .header("Origin", "http://evil.example")
                .body(())
                .unwrap();
            let resp = send(&state, req).await;
            assert!(resp.headers().get("access-control-allow-origin").is_none());
        }

        let state = build_state(false, Some(dir.path()));
        let req = request(Method::GET, "/api/status")
            .header("Origin", "http://localhost:3000")
            .body(())
            .unwrap();
        let resp = send(&state, req).await;
        assert!(resp.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_preflight() {
        let state = build_state(true, None);
        let req = request(Method::OPTIONS, "/api/search")
            .header("Origin", "http://localhost")
            .header("Access-Control-Request-Method", "GET")
            .body(())
            .unwrap();
        let resp = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["access-control-allow-origin"], "http://localhost");
        assert_eq!(resp.headers().get_all("vary").iter().count(), 1);

        let req = request(Method::OPTIONS, "/api/search")
            .header("Origin", "http://evil.example")
            .header("Access-Control-Request-Method", "GET")
            .body(())
            .unwrap();
        let resp = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(resp.headers().get("access-control-allow-origin").is_none());
        assert!(resp.headers().get("access-control-allow-methods").is_none());
        assert_eq!(resp.headers()["allow"], "GET, HEAD, OPTIONS");
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let state = build_state(true, None);
        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let resp = send(&state, request(method, "/api/search?q=rust").body(()).unwrap()).await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        }
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let state = build_state(true, None);
        let req = request(Method::GET, "/api/status")
            .header("Content-Length", "2000000")
            .body(())
            .unwrap();
        assert_eq!(send(&state, req).await.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let dir = frontend_fixture();
        let state = build_state(false, Some(dir.path()));
        let resp = send(&state, request(Method::HEAD, "/").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-length"], "16");
        assert!(body(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_server_header() {
        let state = build_state(true, None);
        let resp = send(&state, request(Method::GET, "/api/status").body(()).unwrap()).await;
        assert_eq!(resp.headers()["server"], "search-server");
    }

    #[tokio::test]
    async fn test_access_log_enabled_path() {
        let state = build_state(true, None);
        state.set_access_log(true);
        let req = request(Method::GET, "/api/search?query=rust")
            .header("User-Agent", "test")
            .body(())
            .unwrap();
        assert_eq!(send(&state, req).await.status(), StatusCode::OK);
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}

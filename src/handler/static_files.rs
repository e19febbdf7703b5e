//! Frontend bundle serving
//!
//! Three kinds of paths reach this module in production mode:
//! - the mount prefix (`/static/...`): files below the bundle directory
//! - configured root files (`/favicon.ico`, `/manifest.json`, ...)
//! - everything else: the index document, so client-side routing can take over

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::config::Frontend;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, CachePolicy, RangeOutcome};
use crate::logger;

pub async fn serve_frontend(ctx: &RequestContext<'_>, frontend: &Frontend) -> Response<Full<Bytes>> {
    if let Some(relative) = frontend.strip_mount(ctx.path) {
        return serve_asset(ctx, &frontend.dir, relative, CachePolicy::for_asset(true)).await;
    }

    if frontend.is_root_file(ctx.path) {
        let relative = ctx.path.trim_start_matches('/');
        return serve_asset(ctx, &frontend.dir, relative, CachePolicy::for_asset(false)).await;
    }

    serve_index(ctx, frontend).await
}

/// SPA fallback: the index document for any other path
async fn serve_index(ctx: &RequestContext<'_>, frontend: &Frontend) -> Response<Full<Bytes>> {
    let Some(content) = frontend.index_html().await else {
        return http::build_404_response();
    };

    let etag = cache::generate_etag(&content);
    let cache_control = CachePolicy::NoCache.header_value();
    if cache::check_etag_match(ctx.if_none_match, &etag) {
        return http::build_304_response(&etag, cache_control);
    }

    http::response::build_html_response(content, &etag, cache_control, ctx.is_head)
}

async fn serve_asset(
    ctx: &RequestContext<'_>,
    dir: &Path,
    relative: &str,
    policy: CachePolicy,
) -> Response<Full<Bytes>> {
    match load_from_directory(dir, relative).await {
        Some((content, content_type)) => {
            build_static_file_response(ctx, Bytes::from(content), content_type, policy)
        }
        None => http::build_404_response(),
    }
}

/// Resolve `relative` inside `dir`, refusing anything that escapes it
async fn resolve(dir: &Path, relative: &str) -> Option<PathBuf> {
    if relative.is_empty() {
        return None;
    }

    let dir_canonical = match fs::canonicalize(dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Frontend directory not found or inaccessible '{}': {e}",
                dir.display()
            ));
            return None;
        }
    };

    // Missing files are a plain 404, not worth a warning
    let file_canonical = fs::canonicalize(dir.join(relative)).await.ok()?;
    if !file_canonical.starts_with(&dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {relative} -> {}",
            file_canonical.display()
        ));
        return None;
    }

    let metadata = fs::metadata(&file_canonical).await.ok()?;
    metadata.is_file().then_some(file_canonical)
}

pub async fn load_from_directory(dir: &Path, relative: &str) -> Option<(Vec<u8>, &'static str)> {
    let file_path = resolve(dir, relative).await?;

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file_path.display()
            ));
            return None;
        }
    };

    Some((content, mime::content_type_for(&file_path)))
}

fn build_static_file_response(
    ctx: &RequestContext<'_>,
    data: Bytes,
    content_type: &str,
    policy: CachePolicy,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);
    let cache_control = policy.header_value();

    // Check if client has cached version
    if cache::check_etag_match(ctx.if_none_match, &etag) {
        return http::build_304_response(&etag, cache_control);
    }

    let total_size = data.len();
    match http::parse_range_header(ctx.range_header, total_size) {
        RangeOutcome::Partial(range) => http::response::build_partial_response(
            data.slice(range.start..=range.end),
            content_type,
            &etag,
            cache_control,
            &range.content_range(total_size),
            ctx.is_head,
        ),
        RangeOutcome::NotSatisfiable => http::build_416_response(total_size),
        RangeOutcome::Full => http::response::build_cached_response(
            data,
            content_type,
            &etag,
            cache_control,
            ctx.is_head,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrontendConfig;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    struct Fixture {
        _root: tempfile::TempDir,
        frontend: Frontend,
    }

    /// `<root>/build` is the bundle; `<root>/secret.txt` sits next to it
    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let build = root.path().join("build");
        std::fs::create_dir_all(build.join("css")).unwrap();
        std::fs::write(build.join("index.html"), "<html>spa</html>").unwrap();
        std::fs::write(build.join("manifest.json"), r#"{"name":"search"}"#).unwrap();
        std::fs::write(build.join("css/app.css"), "0123456789").unwrap();
        std::fs::write(root.path().join("secret.txt"), "secret").unwrap();

        let frontend = Frontend::new(&FrontendConfig {
            dir: build.to_string_lossy().into_owned(),
            ..FrontendConfig::default()
        });
        Fixture {
            _root: root,
            frontend,
        }
    }

    fn ctx<'a>(path: &'a str) -> RequestContext<'a> {
        RequestContext {
            path,
            query: None,
            is_head: false,
            if_none_match: None,
            range_header: None,
        }
    }

    async fn body(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_mounted_asset_is_immutable() {
        let f = fixture();
        let resp = serve_frontend(&ctx("/static/css/app.css"), &f.frontend).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/css; charset=utf-8");
        assert!(resp.headers()["cache-control"]
            .to_str()
            .unwrap()
            .contains("immutable"));
        assert_eq!(body(resp).await, "0123456789");
    }

    #[tokio::test]
    async fn test_root_file() {
        let f = fixture();
        let resp = serve_frontend(&ctx("/manifest.json"), &f.frontend).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "application/json");
        assert_eq!(resp.headers()["cache-control"], "public, max-age=3600");
    }

    #[tokio::test]
    async fn test_missing_root_file_is_404() {
        let f = fixture();
        let resp = serve_frontend(&ctx("/logo512.png"), &f.frontend).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_path_falls_back_to_index() {
        let f = fixture();
        for path in ["/", "/index.html", "/search/rust", "/logo.png"] {
            let resp = serve_frontend(&ctx(path), &f.frontend).await;
            assert_eq!(resp.status(), StatusCode::OK, "{path}");
            assert_eq!(resp.headers()["cache-control"], "no-cache");
            assert_eq!(body(resp).await, "<html>spa</html>");
        }
    }

    #[tokio::test]
    async fn test_missing_index_is_404() {
        let root = tempfile::tempdir().unwrap();
        let frontend = Frontend::new(&FrontendConfig {
            dir: root.path().to_string_lossy().into_owned(),
            ..FrontendConfig::default()
        });
        let resp = serve_frontend(&ctx("/anything"), &frontend).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_is_blocked() {
        let f = fixture();
        for path in ["/static/../secret.txt", "/static/css/../../secret.txt"] {
            let resp = serve_frontend(&ctx(path), &f.frontend).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn test_mount_directory_is_404() {
        let f = fixture();
        for path in ["/static", "/static/", "/static/css"] {
            let resp = serve_frontend(&ctx(path), &f.frontend).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }

    #[tokio::test]
    async fn test_etag_revalidation() {
        let f = fixture();
        let first = serve_frontend(&ctx("/static/css/app.css"), &f.frontend).await;
        let etag = first.headers()["etag"].to_str().unwrap().to_string();

        let mut conditional = ctx("/static/css/app.css");
        conditional.if_none_match = Some(&etag);
        let resp = serve_frontend(&conditional, &f.frontend).await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert!(body(resp).await.is_empty());

        let index = serve_frontend(&ctx("/"), &f.frontend).await;
        let index_etag = index.headers()["etag"].to_str().unwrap().to_string();
        let mut conditional = ctx("/deep/link");
        conditional.if_none_match = Some(&index_etag);
        let resp = serve_frontend(&conditional, &f.frontend).await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_range_requests() {
        let f = fixture();

        let mut partial = ctx("/static/css/app.css");
        partial.range_header = Some("bytes=2-5");
        let resp = serve_frontend(&partial, &f.frontend).await;
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()["content-range"], "bytes 2-5/10");
        assert_eq!(resp.headers()["content-length"], "4");
        assert_eq!(body(resp).await, "2345");

        let mut beyond = ctx("/static/css/app.css");
        beyond.range_header = Some("bytes=50-");
        let resp = serve_frontend(&beyond, &f.frontend).await;
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers()["content-range"], "bytes */10");
    }
}

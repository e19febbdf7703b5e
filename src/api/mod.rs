// API module entry
// Everything under /api: health check, search and related routers, JSON 404

mod related;
mod response;
mod search;
mod types;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::config::AppState;
use crate::http::build_empty_response;

pub use response::{json_response, not_found, ApiError};
pub use types::{RelatedResponse, SearchResponse, SearchResult};

pub const PREFIX: &str = "/api/";
pub const STATUS_PATH: &str = "/api/status";

/// Whether `path` belongs to the API surface
pub fn is_api_path(path: &str) -> bool {
    path.starts_with(PREFIX)
}

/// Dispatch an API request: status, then each router in turn, then 404
pub async fn dispatch(path: &str, query: Option<&str>, state: &AppState) -> Response<Full<Bytes>> {
    if path == STATUS_PATH {
        return build_empty_response(StatusCode::OK);
    }

    if let Some(resp) = search::route(path, query, state).await {
        return resp;
    }
    if let Some(resp) = related::route(path, query, state).await {
        return resp;
    }

    not_found()
}

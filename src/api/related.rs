// Related-documents router
// GET /api/related?id=<document id>&limit=<n>

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::response::{json_response, ApiError};
use super::types::{effective_limit, parse_query, RelatedParams, RelatedResponse, SearchResult};
use crate::config::AppState;
use crate::logger;

pub const PATH: &str = "/api/related";

pub async fn route(
    path: &str,
    query: Option<&str>,
    state: &AppState,
) -> Option<Response<Full<Bytes>>> {
    if path != PATH {
        return None;
    }
    Some(
        related(query, state)
            .await
            .unwrap_or_else(ApiError::into_response),
    )
}

async fn related(query: Option<&str>, state: &AppState) -> Result<Response<Full<Bytes>>, ApiError> {
    let params: RelatedParams = parse_query(query)?;
    let id = params
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("id is required".to_string()))?;

    let settings = &state.config.search;
    let limit = effective_limit(params.limit, settings.default_limit, settings.max_limit)?;

    let searcher = state
        .services
        .searcher
        .as_ref()
        .ok_or(ApiError::Unavailable("search"))?;

    let hits = searcher
        .related(id, limit)
        .await
        .map_err(|e| {
            logger::log_error(&format!("Related lookup for '{id}' failed: {e}"));
            ApiError::Internal("related lookup failed".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound(format!("document '{id}' not found")))?;

    Ok(json_response(
        StatusCode::OK,
        &RelatedResponse {
            id: id.to_string(),
            results: hits.iter().map(|h| SearchResult::from_hit(h, None)).collect(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::testing::{self, FailingSearcher};
    use crate::services::Services;
    use http_body_util::BodyExt;
    use std::sync::Arc;

    fn state_with(services: Services) -> AppState {
        let mut config = Config::default();
        config.app.testing = true;
        AppState::with_services(config, services)
    }

    async fn call(state: &AppState, query: &str) -> (StatusCode, serde_json::Value) {
        let resp = route(PATH, Some(query), state).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_related_excludes_source() {
        let state = state_with(testing::services());
        let (status, body) = call(&state, "id=d1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "d1");
        let results = body["results"].as_array().unwrap();
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r["id"] != "d1"));
        assert!(results.iter().all(|r| r["snippet"].is_null()));
        // d4 contains every term of the title "Rust async runtime"
        assert_eq!(results[0]["id"], "d4");
    }

    #[tokio::test]
    async fn test_related_limit() {
        let state = state_with(testing::services());
        let (_, body) = call(&state, "id=d1&limit=1").await;
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let state = state_with(testing::services());
        let (status, body) = call(&state, "id=nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "document 'nope' not found");
    }

    #[tokio::test]
    async fn test_missing_id_is_bad_request() {
        let state = state_with(testing::services());
        let (status, _) = call(&state, "limit=3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unavailable_and_failing_searcher() {
        let (status, _) = call(&state_with(Services::default()), "id=d1").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let failing = state_with(Services {
            searcher: Some(Arc::new(FailingSearcher)),
            ..Services::default()
        });
        let (status, _) = call(&failing, "id=d1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

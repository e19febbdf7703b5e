// Search router
// GET /api/search: searcher, optional rerank of the candidate window,
// pagination, optional snippets

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::response::{json_response, ApiError};
use super::types::{effective_limit, parse_query, SearchParams, SearchResponse, SearchResult};
use crate::config::AppState;
use crate::logger;
use crate::services::{Hit, SearchHits};

pub const PATH: &str = "/api/search";

/// Handle the request when `path` belongs to this router
pub async fn route(
    path: &str,
    query: Option<&str>,
    state: &AppState,
) -> Option<Response<Full<Bytes>>> {
    if path != PATH {
        return None;
    }
    Some(
        search(query, state)
            .await
            .unwrap_or_else(ApiError::into_response),
    )
}

async fn search(query: Option<&str>, state: &AppState) -> Result<Response<Full<Bytes>>, ApiError> {
    let params: SearchParams = parse_query(query)?;
    let text = params
        .text()
        .ok_or_else(|| ApiError::BadRequest("query must not be empty".to_string()))?
        .to_string();

    let settings = &state.config.search;
    let limit = effective_limit(params.limit, settings.default_limit, settings.max_limit)?;
    let offset = params.offset.unwrap_or(0);

    let searcher = state
        .services
        .searcher
        .as_ref()
        .ok_or(ApiError::Unavailable("search"))?;

    let wanted = offset.saturating_add(limit);
    let fetch = if state.services.ranker.is_some() {
        wanted.max(settings.rerank_window)
    } else {
        wanted
    };

    let SearchHits { total, hits } = searcher.search(&text, fetch).await.map_err(|e| {
        logger::log_error(&format!("Search for '{text}' failed: {e}"));
        ApiError::Internal("search failed".to_string())
    })?;

    let (hits, reranked) = rerank_window(state, &text, hits).await;

    let results = hits
        .iter()
        .skip(offset)
        .take(limit)
        .map(|hit| {
            let snippet = state
                .services
                .highlighter
                .as_ref()
                .and_then(|h| h.highlight(&text, &hit.document));
            SearchResult::from_hit(hit, snippet)
        })
        .collect();

    Ok(json_response(
        StatusCode::OK,
        &SearchResponse {
            query: text,
            total,
            offset,
            limit,
            reranked,
            results,
        },
    ))
}

/// Rerank the first `rerank_window` hits; on ranker failure keep searcher order
async fn rerank_window(state: &AppState, query: &str, mut hits: Vec<Hit>) -> (Vec<Hit>, bool) {
    let Some(ranker) = state.services.ranker.as_ref() else {
        return (hits, false);
    };

    let window = state.config.search.rerank_window.min(hits.len());
    if window == 0 {
        return (hits, false);
    }

    let tail = hits.split_off(window);
    match ranker.rerank(query, hits.clone()).await {
        Ok(mut ranked) => {
            ranked.extend(tail);
            (ranked, true)
        }
        Err(e) => {
            logger::log_warning(&format!("Reranking skipped for '{query}': {e}"));
            hits.extend(tail);
            (hits, false)
        }
    }
}

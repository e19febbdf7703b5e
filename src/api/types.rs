// API data types module
// Query parameters accepted by the routers and the JSON they return

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::response::ApiError;
use crate::services::Hit;

/// `GET /api/search` parameters; `q` is accepted as a short alias of `query`
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl SearchParams {
    /// Trimmed query text, `query` winning over `q`
    pub fn text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .or(self.q.as_deref())
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// `GET /api/related` parameters
#[derive(Debug, Default, Deserialize)]
pub struct RelatedParams {
    pub id: Option<String>,
    pub limit: Option<usize>,
}

/// Decode a URL query string, mapping bad input to 400
pub fn parse_query<T: DeserializeOwned>(query: Option<&str>) -> Result<T, ApiError> {
    serde_urlencoded::from_str(query.unwrap_or(""))
        .map_err(|e| ApiError::BadRequest(format!("invalid query parameters: {e}")))
}

/// Resolve a requested page size against the configured default and cap
pub fn effective_limit(
    requested: Option<usize>,
    default: usize,
    max: usize,
) -> Result<usize, ApiError> {
    match requested.unwrap_or(default) {
        0 => Err(ApiError::BadRequest("limit must be greater than 0".to_string())),
        n => Ok(n.min(max.max(1))),
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub score: f32,
    pub snippet: Option<String>,
}

impl SearchResult {
    pub fn from_hit(hit: &Hit, snippet: Option<String>) -> Self {
        Self {
            id: hit.document.id.clone(),
            title: hit.document.title.clone(),
            url: hit.document.url.clone(),
            score: hit.score,
            snippet,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
    pub reranked: bool,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Serialize)]
pub struct RelatedResponse {
    pub id: String,
    pub results: Vec<SearchResult>,
}

//! Neural reranking through a model-serving endpoint
//!
//! The model itself runs out of process. `ModelRanker` posts the query and the
//! candidate texts as JSON and expects one relevance score per candidate:
//!
//! ```text
//! POST {endpoint}  {"query": "...", "documents": ["...", "..."]}
//! 200 OK           {"scores": [0.93, 0.12]}
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Hit, Ranker, ServiceError};
use crate::config::RankerConfig;

pub struct ModelRanker {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    query: &'a str,
    documents: Vec<String>,
}

#[derive(Deserialize)]
struct RerankResponse {
    scores: Vec<f32>,
}

impl ModelRanker {
    pub fn new(config: &RankerConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ServiceError::Ranker(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl Ranker for ModelRanker {
    async fn rerank(&self, query: &str, hits: Vec<Hit>) -> Result<Vec<Hit>, ServiceError> {
        if hits.is_empty() {
            return Ok(hits);
        }

        let request = RerankRequest {
            query,
            documents: hits
                .iter()
                .map(|h| format!("{}\n{}", h.document.title, h.document.body))
                .collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ServiceError::Ranker(e.to_string()))?;

        let body: RerankResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Ranker(format!("invalid response body: {e}")))?;

        apply_scores(hits, &body.scores)
    }
}

/// Replace hit scores with model scores and reorder, highest first
fn apply_scores(hits: Vec<Hit>, scores: &[f32]) -> Result<Vec<Hit>, ServiceError> {
    if hits.len() != scores.len() {
        return Err(ServiceError::Ranker(format!(
            "expected {} scores, got {}",
            hits.len(),
            scores.len()
        )));
    }

    let mut reranked: Vec<Hit> = hits
        .into_iter()
        .zip(scores)
        .map(|(hit, &score)| Hit { score, ..hit })
        .collect();
    reranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(reranked)
}

//! Test doubles and a small fixture corpus

use async_trait::async_trait;
use std::sync::Arc;

use super::{
    CorpusSearcher, Document, Highlighter, Hit, Ranker, SearchHits, Searcher, ServiceError,
    Services, TermHighlighter,
};
use crate::config::HighlightConfig;

pub fn doc(id: &str, title: &str, body: &str) -> Document {
    Document {
        id: id.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        url: Some(format!("https://docs.example/{id}")),
    }
}

/// Four documents; "rust" matches d1, d2 and d4, in that order of score ties
pub fn corpus() -> Vec<Document> {
    vec![
        doc("d1", "Rust async runtime", "Tokio schedules rust tasks"),
        doc("d2", "Rust ownership", "Borrowing and lifetimes"),
        doc("d3", "Python packaging", "Wheels and eggs"),
        doc("d4", "Async Rust patterns", "Futures and runtime design"),
    ]
}

pub fn searcher() -> Arc<dyn Searcher> {
    Arc::new(CorpusSearcher::from_documents(corpus()))
}

pub fn highlighter() -> Arc<dyn Highlighter> {
    Arc::new(TermHighlighter::new(&HighlightConfig::default()))
}

/// Searcher and highlighter, no ranker
pub fn services() -> Services {
    Services {
        searcher: Some(searcher()),
        ranker: None,
        highlighter: Some(highlighter()),
    }
}

/// Reverses the candidate order and scores by new position
pub struct ReversingRanker;

#[async_trait]
impl Ranker for ReversingRanker {
    async fn rerank(&self, _query: &str, hits: Vec<Hit>) -> Result<Vec<Hit>, ServiceError> {
        #[allow(clippy::cast_precision_loss)]
        let reranked = hits
            .into_iter()
            .rev()
            .enumerate()
            .map(|(i, hit)| Hit {
                score: 10.0 - i as f32,
                ..hit
            })
            .collect();
        Ok(reranked)
    }
}

pub struct FailingRanker;

#[async_trait]
impl Ranker for FailingRanker {
    async fn rerank(&self, _query: &str, _hits: Vec<Hit>) -> Result<Vec<Hit>, ServiceError> {
        Err(ServiceError::Ranker("model endpoint unavailable".to_string()))
    }
}

pub struct FailingSearcher;

fn offline() -> ServiceError {
    ServiceError::Corpus {
        path: "corpus.json".to_string(),
        source: std::io::Error::other("index offline"),
    }
}

#[async_trait]
impl Searcher for FailingSearcher {
    async fn search(&self, _query: &str, _limit: usize) -> Result<SearchHits, ServiceError> {
        Err(offline())
    }

    async fn related(&self, _id: &str, _limit: usize) -> Result<Option<Vec<Hit>>, ServiceError> {
        Err(offline())
    }

    fn document_count(&self) -> usize {
        0
    }
}

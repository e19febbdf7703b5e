//! Collaborator services
//!
//! The API routers only see three traits:
//! - [`Searcher`]: candidate retrieval and related-document lookup
//! - [`Ranker`]: reordering of a candidate window by an external model
//! - [`Highlighter`]: snippet extraction for presentation
//!
//! [`Services`] holds whichever of them the `app` flags enabled. The bundled
//! implementations ([`CorpusSearcher`], [`ModelRanker`], [`TermHighlighter`])
//! keep the binary runnable; other engines plug in behind the same traits.

pub mod highlighter;
pub mod ranker;
pub mod searcher;
pub mod tokenizer;

#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;
use crate::logger;

pub use highlighter::TermHighlighter;
pub use ranker::ModelRanker;
pub use searcher::CorpusSearcher;

/// One searchable document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A scored document produced by a searcher or ranker
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub document: Arc<Document>,
    pub score: f32,
}

/// Outcome of a search: the best hits plus the number of matches overall
#[derive(Debug, Clone, Default)]
pub struct SearchHits {
    pub total: usize,
    pub hits: Vec<Hit>,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to read corpus '{path}': {source}")]
    Corpus {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse corpus '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("ranker request failed: {0}")]
    Ranker(String),
}

#[async_trait]
pub trait Searcher: Send + Sync {
    /// Best matches for `query`, highest score first, at most `limit`
    async fn search(&self, query: &str, limit: usize) -> Result<SearchHits, ServiceError>;

    /// Documents related to the document `id`; `None` when `id` is unknown
    async fn related(&self, id: &str, limit: usize) -> Result<Option<Vec<Hit>>, ServiceError>;

    fn document_count(&self) -> usize;
}

#[async_trait]
pub trait Ranker: Send + Sync {
    /// Reorder `hits` for `query`; the result holds the same documents
    async fn rerank(&self, query: &str, hits: Vec<Hit>) -> Result<Vec<Hit>, ServiceError>;
}

pub trait Highlighter: Send + Sync {
    /// HTML snippet of `document` with the query terms marked
    fn highlight(&self, query: &str, document: &Document) -> Option<String>;
}

/// Collaborators attached to the application state
#[derive(Clone, Default)]
pub struct Services {
    pub searcher: Option<Arc<dyn Searcher>>,
    pub ranker: Option<Arc<dyn Ranker>>,
    pub highlighter: Option<Arc<dyn Highlighter>>,
}

impl Services {
    /// Construct the services enabled by `config.app`
    ///
    /// Testing mode constructs nothing. Otherwise the searcher is always
    /// built, the highlighter and ranker only when their flags are set.
    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        if config.app.testing {
            logger::write_info("Testing mode: search services are not initialized");
            return Ok(Self::default());
        }

        let highlighter: Option<Arc<dyn Highlighter>> = if config.app.highlight {
            Some(Arc::new(TermHighlighter::new(&config.highlight)))
        } else {
            None
        };

        let ranker: Option<Arc<dyn Ranker>> = if config.app.neural_ranking {
            Some(Arc::new(ModelRanker::new(&config.ranker)?))
        } else {
            None
        };

        let searcher = CorpusSearcher::load(&config.search.corpus_path)?;
        logger::write_info(&format!(
            "Loaded {} documents from {}",
            searcher.document_count(),
            config.search.corpus_path
        ));

        Ok(Self {
            searcher: Some(Arc::new(searcher)),
            ranker,
            highlighter,
        })
    }
}

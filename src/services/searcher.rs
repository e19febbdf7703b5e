//! In-memory corpus searcher
//!
//! Loads a JSON array of [`Document`]s once and answers queries with a linear
//! scan: a document scores the fraction of distinct query terms it contains.
//! Ties keep corpus order.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use super::tokenizer::{tokenize_query, tokenize_text};
use super::{Document, Hit, SearchHits, Searcher, ServiceError};

pub struct CorpusSearcher {
    documents: Vec<Arc<Document>>,
    /// Terms of title and body, parallel to `documents`
    terms: Vec<HashSet<String>>,
    positions: HashMap<String, usize>,
}

impl CorpusSearcher {
    /// Read and index the corpus file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let raw = std::fs::read(path).map_err(|source| ServiceError::Corpus {
            path: display.clone(),
            source,
        })?;
        let documents: Vec<Document> = serde_json::from_slice(&raw)
            .map_err(|source| ServiceError::Parse { path: display, source })?;

        Ok(Self::from_documents(documents))
    }

    pub fn from_documents(documents: Vec<Document>) -> Self {
        let mut positions = HashMap::with_capacity(documents.len());
        let mut terms = Vec::with_capacity(documents.len());

        for (i, doc) in documents.iter().enumerate() {
            // First occurrence wins on duplicate ids
            positions.entry(doc.id.clone()).or_insert(i);
            let mut doc_terms = tokenize_text(&doc.title);
            doc_terms.extend(tokenize_text(&doc.body));
            terms.push(doc_terms);
        }

        Self {
            documents: documents.into_iter().map(Arc::new).collect(),
            terms,
            positions,
        }
    }

    /// Score every document except `skip` against `query_terms`
    fn rank(&self, query_terms: &[String], skip: Option<usize>) -> Vec<Hit> {
        if query_terms.is_empty() {
            return Vec::new();
        }

        #[allow(clippy::cast_precision_loss)]
        let denominator = query_terms.len() as f32;

        let mut hits: Vec<Hit> = self
            .terms
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .filter_map(|(i, doc_terms)| {
                let matched = query_terms.iter().filter(|t| doc_terms.contains(*t)).count();
                #[allow(clippy::cast_precision_loss)]
                let score = matched as f32 / denominator;
                (matched > 0).then(|| Hit {
                    document: Arc::clone(&self.documents[i]),
                    score,
                })
            })
            .collect();

        // Stable sort keeps corpus order among equal scores
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits
    }
}

#[async_trait]
impl Searcher for CorpusSearcher {
    async fn search(&self, query: &str, limit: usize) -> Result<SearchHits, ServiceError> {
        let mut hits = self.rank(&tokenize_query(query), None);
        let total = hits.len();
        hits.truncate(limit);
        Ok(SearchHits { total, hits })
    }

    async fn related(&self, id: &str, limit: usize) -> Result<Option<Vec<Hit>>, ServiceError> {
        let Some(&position) = self.positions.get(id) else {
            return Ok(None);
        };

        let source = &self.documents[position];
        let mut query_terms = tokenize_query(&source.title);
        if query_terms.is_empty() {
            query_terms = tokenize_query(&source.body);
        }

        let mut hits = self.rank(&query_terms, Some(position));
        hits.truncate(limit);
        Ok(Some(hits))
    }

    fn document_count(&self) -> usize {
        self.documents.len()
    }
}

//! Query-term snippet highlighting

use std::collections::HashSet;

use super::tokenizer::{tokenize_query, word_spans};
use super::{Document, Highlighter};
use crate::config::HighlightConfig;

const ELLIPSIS: &str = "…";

pub struct TermHighlighter {
    snippet_chars: usize,
    pre_tag: String,
    post_tag: String,
}

impl TermHighlighter {
    pub fn new(config: &HighlightConfig) -> Self {
        Self {
            snippet_chars: config.snippet_chars.max(1),
            pre_tag: config.pre_tag.clone(),
            post_tag: config.post_tag.clone(),
        }
    }

    /// Byte spans of the words in `text` equal to one of `terms`
    ///
    /// Words are split exactly as the searcher splits them, so every
    /// document the searcher matched yields at least one span.
    fn term_spans(terms: &HashSet<String>, text: &str) -> Vec<(usize, usize)> {
        word_spans(text)
            .filter(|&(start, end)| terms.contains(&text[start..end].to_lowercase()))
            .collect()
    }

    /// Byte range of at most `snippet_chars` characters centered on `hit_start`
    fn window(&self, text: &str, hit_start: usize, hit_end: usize) -> (usize, usize) {
        let before = self.snippet_chars / 2;
        let start = text[..hit_start]
            .char_indices()
            .rev()
            .take(before)
            .last()
            .map_or(hit_start, |(i, _)| i);
        let end = text[start..]
            .char_indices()
            .nth(self.snippet_chars)
            .map_or(text.len(), |(i, _)| start + i);
        (start, end.max(hit_end))
    }

    /// Escape `text[start..end]` and wrap the spans lying inside it in tags
    fn mark(&self, text: &str, spans: &[(usize, usize)], start: usize, end: usize) -> String {
        let mut out = String::with_capacity(end - start + 32);
        let mut last = start;
        for &(s, e) in spans.iter().filter(|&&(s, e)| s >= start && e <= end) {
            out.push_str(&htmlescape::encode_minimal(&text[last..s]));
            out.push_str(&self.pre_tag);
            out.push_str(&htmlescape::encode_minimal(&text[s..e]));
            out.push_str(&self.post_tag);
            last = e;
        }
        out.push_str(&htmlescape::encode_minimal(&text[last..end]));
        out
    }
}

impl Highlighter for TermHighlighter {
    fn highlight(&self, query: &str, document: &Document) -> Option<String> {
        let terms: HashSet<String> = tokenize_query(query).into_iter().collect();
        if terms.is_empty() {
            return None;
        }

        let body = document.body.as_str();
        let spans = Self::term_spans(&terms, body);
        let &(first_start, first_end) = spans.first()?;

        let (start, end) = self.window(body, first_start, first_end);
        let mut snippet = String::new();
        if start > 0 {
            snippet.push_str(ELLIPSIS);
        }
        snippet.push_str(&self.mark(body, &spans, start, end));
        if end < body.len() {
            snippet.push_str(ELLIPSIS);
        }
        Some(snippet)
    }
}

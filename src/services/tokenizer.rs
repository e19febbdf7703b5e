//! Text normalization shared by the searcher and highlighter

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Terms shorter than this carry too little signal to match on
pub const MIN_TERM_LEN: usize = 2;

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"[\p{L}\p{N}]+").expect("static word pattern is valid"))
}

/// Byte spans of the words in `text`, as the tokenizer splits them
pub fn word_spans(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    word_pattern().find_iter(text).map(|m| (m.start(), m.end()))
}

/// Distinct lowercase terms of a document field
pub fn tokenize_text(text: &str) -> HashSet<String> {
    word_pattern()
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|word| word.chars().count() >= MIN_TERM_LEN)
        .collect()
}

/// Lowercase query terms in query order, duplicates removed
pub fn tokenize_query(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    word_pattern()
        .find_iter(&query.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|word| word.chars().count() >= MIN_TERM_LEN)
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

//! Lexical query derivation and token helpers shared by the adapters.
//!
//! No semantics here: everything is case-folded substring and token work.
//! Each adapter picks its own word budget; PubMed and Wikipedia additionally
//! reuse the token extractors for relevance scoring.

/// Hedging boilerplate stripped before a claim becomes a search query.
const HEDGE_PHRASES: &[&str] = &[
    "according to",
    "studies show that",
    "studies show",
    "research shows that",
    "research shows",
    "experts say",
    "scientists say",
    "it is said that",
    "some people say",
    "i heard that",
    "they say that",
    "they say",
    "apparently",
    "reportedly",
];

/// Common words ignored when picking significant terms.
const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "because", "been", "before",
    "being", "below", "between", "could", "doing", "during", "every", "further",
    "having", "other", "others", "should", "since", "still", "their", "there",
    "these", "thing", "things", "those", "through", "under", "until", "where",
    "which", "while", "would", "years",
];

/// Derive a short search query: strip hedging phrases, then keep the first
/// `max_words` whitespace-separated words.
pub fn search_query(text: &str, max_words: usize) -> String {
    let mut lowered = text.to_lowercase();
    for phrase in HEDGE_PHRASES {
        while let Some(pos) = lowered.find(phrase) {
            lowered.replace_range(pos..pos + phrase.len(), " ");
        }
    }
    lowered
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercased alphanumeric tokens of at least `min_len` characters.
pub fn tokens(text: &str, min_len: usize) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= min_len)
        .map(|t| t.to_string())
        .collect()
}

/// Count tokens (≥ `min_len` chars) that appear in both texts.
pub fn shared_token_count(a: &str, b: &str, min_len: usize) -> usize {
    let b_tokens: std::collections::HashSet<String> = tokens(b, min_len).into_iter().collect();
    let mut seen = std::collections::HashSet::new();
    tokens(a, min_len)
        .into_iter()
        .filter(|t| b_tokens.contains(t) && seen.insert(t.clone()))
        .count()
}

/// Significant words of a claim: ≥5 chars and not a stop word. Deduped,
/// order of first occurrence preserved.
pub fn significant_words(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tokens(text, 5)
        .into_iter()
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Tokens that carry digits ("2024", "100c", "75"). Deduped, order kept.
pub fn numeric_tokens(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tokens(text, 1)
        .into_iter()
        .filter(|t| t.chars().any(|c| c.is_ascii_digit()))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

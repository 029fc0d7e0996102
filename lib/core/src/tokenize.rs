// Shared tokenizer for lexical scoring and hashed embeddings
use ahash::AHashSet;

/// Tokenize text into lowercase terms.
/// Splits on whitespace and ASCII punctuation; single ASCII characters are dropped.
#[inline]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .map(|s| s.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|s| !s.is_empty() && s.len() > 1)
        .collect()
}

/// Distinct terms of `text`
pub fn token_set(text: &str) -> AHashSet<String> {
    tokenize(text).into_iter().collect()
}

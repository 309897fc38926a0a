//! Lexical similarity between short texts.
//!
//! Cosine over lower-cased word-token counts. Stands in for embedding
//! distance when ranking memories.

use std::collections::HashMap;

fn token_counts(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        *counts.entry(token.to_lowercase()).or_insert(0) += 1;
    }
    counts
}

/// Cosine similarity in `[0, 1]`. Texts without any word tokens score 0.
pub fn lexical_similarity(a: &str, b: &str) -> f32 {
    let left = token_counts(a);
    let right = token_counts(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let dot: f64 = left
        .iter()
        .filter_map(|(token, &n)| right.get(token).map(|&m| f64::from(n) * f64::from(m)))
        .sum();
    let norm = |counts: &HashMap<String, u32>| {
        counts
            .values()
            .map(|&n| f64::from(n) * f64::from(n))
            .sum::<f64>()
            .sqrt()
    };

    (dot / (norm(&left) * norm(&right))) as f32
}

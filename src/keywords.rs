// src/keywords.rs
//! Frequency-based keyword extraction over a batch of texts.
//!
//! Counts alphabetic runs of length >= 3 across the whole batch and returns
//! the `top_k` most frequent, ties broken by first occurrence. No stopword
//! filtering happens here; that is intentional and distinct from the
//! normalizer's stopword removal.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static RE_ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]{3,}").unwrap());

pub const DEFAULT_TOP_K: usize = 20;

pub fn extract_keywords<S: AsRef<str>>(texts: &[S], top_k: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for text in texts {
        let lowered = text.as_ref().to_lowercase();
        for m in RE_ALPHA.find_iter(&lowered) {
            let tok = m.as_str().to_string();
            if !counts.contains_key(&tok) {
                first_seen.push(tok.clone());
            }
            *counts.entry(tok).or_insert(0) += 1;
        }
    }

    // Stable sort keeps first-occurrence order among equal frequencies,
    // which makes the output deterministic.
    let mut ranked = first_seen;
    ranked.sort_by_key(|t| std::cmp::Reverse(counts[t]));
    ranked.truncate(top_k);
    ranked
}

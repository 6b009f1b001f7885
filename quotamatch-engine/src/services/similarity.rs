//! Similarity fallback matcher
//!
//! Ranks catalog records against an unmatched request by TF-IDF cosine
//! similarity, computed per candidate over the two-document corpus
//! {request text, record text}. The matcher is built once per batch with
//! per-record term counts precomputed; scoring each request is then a single
//! pass over the catalog, with a ranking identical to the pairwise
//! definition.

use crate::models::QuotaRecord;
use std::collections::HashMap;

/// Catalog index for fallback matching
pub struct SimilarityMatcher {
    records: Vec<QuotaRecord>,
    term_counts: Vec<HashMap<String, f64>>,
}

impl SimilarityMatcher {
    /// Build the index over one `scan_all` result
    pub fn build(records: Vec<QuotaRecord>) -> Self {
        let term_counts = records
            .iter()
            .map(|record| term_counts(&record.comparison_text()))
            .collect();
        Self {
            records,
            term_counts,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The best-scoring record for the request text, or `None` only when the
    /// catalog is empty.
    ///
    /// Selection starts from -1 and assigns on strict `>`, so ties are
    /// first-encountered-wins and the first record scanned is assigned even
    /// at similarity 0.
    pub fn best_match(&self, request_text: &str) -> Option<&QuotaRecord> {
        let request_counts = term_counts(request_text);

        let mut best_similarity = -1.0_f64;
        let mut best_index = None;
        for (index, record_counts) in self.term_counts.iter().enumerate() {
            let similarity = cosine(&request_counts, record_counts);
            if similarity > best_similarity {
                best_similarity = similarity;
                best_index = Some(index);
            }
        }

        best_index.map(|index| &self.records[index])
    }
}

/// Pairwise TF-IDF cosine similarity of two texts, in [0, 1].
/// 0 if either side produces no terms.
pub fn similarity(text1: &str, text2: &str) -> f64 {
    cosine(&term_counts(text1), &term_counts(text2))
}

/// Term frequencies of one text. Terms are maximal runs of Unicode
/// alphanumeric characters (underscore included) of length >= 2 characters,
/// lowercased.
fn term_counts(text: &str) -> HashMap<String, f64> {
    let mut counts = HashMap::new();
    let mut term = String::new();
    let mut term_chars = 0usize;

    for c in text.chars().chain(std::iter::once(' ')) {
        if c.is_alphanumeric() || c == '_' {
            for lc in c.to_lowercase() {
                term.push(lc);
            }
            term_chars += 1;
        } else if term_chars > 0 {
            if term_chars >= 2 {
                *counts.entry(std::mem::take(&mut term)).or_insert(0.0) += 1.0;
            } else {
                term.clear();
            }
            term_chars = 0;
        }
    }

    counts
}

/// Cosine of the TF-IDF vectors of two documents over their own
/// two-document corpus, with the smoothed IDF `ln((1 + N) / (1 + df)) + 1`.
fn cosine(counts1: &HashMap<String, f64>, counts2: &HashMap<String, f64>) -> f64 {
    if counts1.is_empty() || counts2.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm1 = 0.0;
    let mut norm2 = 0.0;

    let vocabulary = counts1
        .keys()
        .chain(counts2.keys().filter(|t| !counts1.contains_key(*t)));
    for term in vocabulary {
        let tf1 = counts1.get(term).copied().unwrap_or(0.0);
        let tf2 = counts2.get(term).copied().unwrap_or(0.0);
        let df = (tf1 > 0.0) as u8 + (tf2 > 0.0) as u8;
        let idf = (3.0 / (1.0 + df as f64)).ln() + 1.0;

        let w1 = tf1 * idf;
        let w2 = tf2 * idf;
        dot += w1 * w2;
        norm1 += w1 * w1;
        norm2 += w2 * w2;
    }

    if norm1 == 0.0 || norm2 == 0.0 {
        0.0
    } else {
        dot / (norm1.sqrt() * norm2.sqrt())
    }
}

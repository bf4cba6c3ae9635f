//! Okapi BM25 ranking over an in-memory document list.
//!
//! Documents are addressed by position; callers keep a parallel list to map
//! a hit back to whatever identifies the document.

use crate::index::tokenize::tokenize;
use std::collections::HashMap;

/// Term-frequency saturation.
const K1: f64 = 1.2;
/// Length normalization strength.
const B: f64 = 0.75;

/// A scored document position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub position: usize,
    pub score: f64,
}

pub struct Bm25Index {
    /// Per-document term counts.
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lengths: Vec<usize>,
    /// Number of documents containing each term.
    doc_freqs: HashMap<String, usize>,
    avg_doc_length: f64,
}

impl Bm25Index {
    /// Build an index over `documents`, preserving their order.
    pub fn build<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut term_freqs = Vec::new();
        let mut doc_lengths = Vec::new();
        let mut doc_freqs: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = tokenize(doc.as_ref());
            doc_lengths.push(tokens.len());

            let mut counts: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *counts.entry(token).or_insert(0) += 1;
            }
            for term in counts.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(counts);
        }

        let total: usize = doc_lengths.iter().sum();
        let avg_doc_length = if doc_lengths.is_empty() {
            0.0
        } else {
            total as f64 / doc_lengths.len() as f64
        };

        Self {
            term_freqs,
            doc_lengths,
            doc_freqs,
            avg_doc_length,
        }
    }

    pub fn len(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lengths.is_empty()
    }

    fn idf(&self, term: &str) -> f64 {
        let n = self.len() as f64;
        let df = self.doc_freqs.get(term).copied().unwrap_or(0) as f64;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Score every document against `query` and return the best `limit`
    /// hits, highest first. Documents scoring zero are not hits; equal
    /// scores keep document order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<Hit> {
        let mut terms = tokenize(query);
        terms.sort();
        terms.dedup();

        if terms.is_empty() || self.is_empty() {
            return Vec::new();
        }

        let idfs: Vec<(&str, f64)> = terms
            .iter()
            .filter(|t| self.doc_freqs.contains_key(t.as_str()))
            .map(|t| (t.as_str(), self.idf(t)))
            .collect();

        let mut hits: Vec<Hit> = self
            .term_freqs
            .iter()
            .zip(&self.doc_lengths)
            .enumerate()
            .filter_map(|(position, (freqs, &len))| {
                let norm = if self.avg_doc_length > 0.0 {
                    K1 * (1.0 - B + B * len as f64 / self.avg_doc_length)
                } else {
                    K1
                };
                let score: f64 = idfs
                    .iter()
                    .filter_map(|(term, idf)| {
                        freqs.get(*term).map(|&tf| {
                            let tf = f64::from(tf);
                            idf * tf * (K1 + 1.0) / (tf + norm)
                        })
                    })
                    .sum();
                (score > 0.0).then_some(Hit { position, score })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(limit);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bm25Index {
        Bm25Index::build([
            "feed.md Building a feed of notes from followed authors",
            "zap.md Sending a zap to a note",
            "zap-request.md Creating a zap request event for a lightning zap",
            "profile.md Editing profile metadata",
        ])
    }

    #[test]
    fn test_ranks_by_term_frequency() {
        let hits = sample().search("zap", 5);
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();

        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0], 2, "document mentioning zap three times wins");
        assert!(positions.contains(&1));
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_no_matching_terms_returns_nothing() {
        assert!(sample().search("relay", 5).is_empty());
        assert!(sample().search("   ", 5).is_empty());
    }

    #[test]
    fn test_limit_truncates() {
        let hits = sample().search("a", 2);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_search_is_deterministic() {
        let index = sample();
        let first = index.search("a note zap", 5);
        for _ in 0..10 {
            assert_eq!(index.search("a note zap", 5), first);
        }
    }

    #[test]
    fn test_ties_keep_document_order() {
        let index = Bm25Index::build(["same words", "same words", "same words"]);
        let positions: Vec<usize> = index.search("same", 5).iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let index = sample();
        assert_eq!(index.search("PROFILE", 5), index.search("profile", 5));
    }

    #[test]
    fn test_empty_index() {
        let index = Bm25Index::build(Vec::<String>::new());
        assert!(index.is_empty());
        assert!(index.search("anything", 5).is_empty());
    }
}

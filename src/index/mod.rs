pub mod bm25;
pub mod tokenize;

pub use bm25::{Bm25Index, Hit};
pub use tokenize::tokenize;

use crate::ingestion::ContentCategory;
use std::collections::BTreeMap;

/// A search result resolved back to its document path.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPath {
    pub path: String,
    pub score: f64,
}

/// One category's documents plus the ranking index built over them.
///
/// `paths[i]` is the document the index knows as position `i`; the two are
/// built from the same iteration and never change afterwards.
pub struct Corpus {
    category: ContentCategory,
    documents: BTreeMap<String, String>,
    paths: Vec<String>,
    index: Option<Bm25Index>,
}

impl Corpus {
    /// Build the corpus and its index. An empty collection gets no index.
    pub fn build(category: ContentCategory, documents: BTreeMap<String, String>) -> Self {
        let paths: Vec<String> = documents.keys().cloned().collect();

        let index = if documents.is_empty() {
            tracing::warn!(%category, "No documents in category, search index not built");
            None
        } else {
            let start = std::time::Instant::now();
            let index = Bm25Index::build(
                documents
                    .iter()
                    .map(|(path, text)| format!("{} {}", path, text)),
            );
            tracing::info!(
                %category,
                documents = index.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Search index built"
            );
            Some(index)
        };

        Self {
            category,
            documents,
            paths,
            index,
        }
    }

    pub fn category(&self) -> ContentCategory {
        self.category
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// All paths in lexical order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Exact lookup, returning the corpus-owned path with the text.
    pub fn get_entry(&self, path: &str) -> Option<(&str, &str)> {
        self.documents
            .get_key_value(path)
            .map(|(p, t)| (p.as_str(), t.as_str()))
    }

    pub fn documents(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documents
            .iter()
            .map(|(path, text)| (path.as_str(), text.as_str()))
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    /// Rank documents against `query`. `None` when no index was built.
    pub fn search(&self, query: &str, limit: usize) -> Option<Vec<ScoredPath>> {
        let index = self.index.as_ref()?;
        let hits = index
            .search(query, limit)
            .into_iter()
            .filter_map(|hit| {
                self.paths.get(hit.position).map(|path| ScoredPath {
                    path: path.clone(),
                    score: hit.score,
                })
            })
            .collect();
        Some(hits)
    }
}

//! Keyword search handler.
//!
//! Ranks a category's documents against the query with BM25 over
//! `"{path} {text}"` and reports the top hits as `<path> (<score>)` lines.

use crate::error::ToolError;
use crate::index::Corpus;
use crate::tools::Tool;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SearchArgs {
    #[serde(default)]
    query: Option<String>,
}

/// `search_<category>`: BM25 keyword search.
pub struct SearchTool {
    name: String,
    description: String,
    corpus: Arc<Corpus>,
    limit: usize,
}

impl SearchTool {
    pub fn new(corpus: Arc<Corpus>, limit: usize) -> Self {
        let category = corpus.category();
        Self {
            name: format!("search_{}", category.plural_slug()),
            description: format!(
                "Search {} by keywords. Returns up to {} matching paths ranked by relevance.",
                category.collection_label(),
                limit
            ),
            corpus,
            limit,
        }
    }
}

impl Tool for SearchTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Keywords to search for"
                }
            },
            "required": ["query"]
        })
    }

    fn invoke(&self, args: Value) -> Result<String, ToolError> {
        let args: SearchArgs = serde_json::from_value(args)?;
        let query = args.query.unwrap_or_default();
        if query.trim().is_empty() {
            return Ok("Error: query is required".to_string());
        }

        let start = std::time::Instant::now();
        let category = self.corpus.category();

        let Some(results) = self.corpus.search(&query, self.limit) else {
            return Ok("Search index not available".to_string());
        };

        let elapsed = start.elapsed();
        metrics::counter!("search_requests_total", "category" => category.plural_slug())
            .increment(1);
        metrics::histogram!("search_latency_us").record(elapsed.as_micros() as f64);

        tracing::info!(
            %category,
            query = %query,
            hits = results.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "Search completed"
        );

        if results.is_empty() {
            return Ok(format!(
                "No {} found for query: {}",
                category.collection_label(),
                query
            ));
        }

        let mut lines = vec![format!("Search results for \"{}\":", query)];
        lines.extend(
            results
                .iter()
                .map(|hit| format!("{} ({:.2})", hit.path, hit.score)),
        );
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::ContentCategory;
    use std::collections::BTreeMap;

    fn tool(category: ContentCategory, entries: &[(&str, &str)]) -> SearchTool {
        let docs: BTreeMap<String, String> = entries
            .iter()
            .map(|(p, t)| (p.to_string(), t.to_string()))
            .collect();
        SearchTool::new(Arc::new(Corpus::build(category, docs)), 5)
    }

    #[test]
    fn test_formats_ranked_results() {
        let tool = tool(
            ContentCategory::Recipe,
            &[
                ("feed.md", "Building a feed of notes"),
                ("zap.md", "Sending zaps"),
            ],
        );
        assert_eq!(tool.name(), "search_recipes");

        let text = tool.invoke(json!({ "query": "feed" })).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Search results for \"feed\":");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("feed.md ("));
        assert!(lines[1].ends_with(')'));
        let score = &lines[1]["feed.md (".len()..lines[1].len() - 1];
        assert_eq!(score.split('.').nth(1).map(str::len), Some(2));
    }

    #[test]
    fn test_caps_at_limit() {
        let entries: Vec<(String, String)> = (0..8)
            .map(|i| (format!("note-{}.md", i), "shared keyword".to_string()))
            .collect();
        let borrowed: Vec<(&str, &str)> = entries
            .iter()
            .map(|(p, t)| (p.as_str(), t.as_str()))
            .collect();

        let text = tool(ContentCategory::Doc, &borrowed)
            .invoke(json!({ "query": "keyword" }))
            .unwrap();
        assert_eq!(text.lines().count(), 1 + 5);
    }

    #[test]
    fn test_no_results() {
        let text = tool(ContentCategory::Doc, &[("zap.md", "Zaps")])
            .invoke(json!({ "query": "relay" }))
            .unwrap();
        assert_eq!(text, "No documentation found for query: relay");

        let text = tool(ContentCategory::Recipe, &[("zap.md", "Zaps")])
            .invoke(json!({ "query": "relay" }))
            .unwrap();
        assert_eq!(text, "No recipes found for query: relay");
    }

    #[test]
    fn test_empty_category_has_no_index() {
        let text = tool(ContentCategory::Doc, &[])
            .invoke(json!({ "query": "anything" }))
            .unwrap();
        assert_eq!(text, "Search index not available");
    }

    #[test]
    fn test_blank_query_rejected_as_text() {
        let tool = tool(ContentCategory::Doc, &[("zap.md", "Zaps")]);
        assert_eq!(tool.invoke(json!({ "query": "" })).unwrap(), "Error: query is required");
        assert_eq!(tool.invoke(json!({})).unwrap(), "Error: query is required");
    }

    #[test]
    fn test_same_query_same_output() {
        let tool = tool(
            ContentCategory::Doc,
            &[
                ("a.md", "relay pool relay"),
                ("b.md", "relay"),
                ("c.md", "pool"),
            ],
        );
        let first = tool.invoke(json!({ "query": "relay pool" })).unwrap();
        for _ in 0..5 {
            assert_eq!(tool.invoke(json!({ "query": "relay pool" })).unwrap(), first);
        }
    }
}

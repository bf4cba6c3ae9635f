use crate::error::ToolError;
use crate::index::Corpus;
use crate::tools::Tool;
use serde_json::{json, Value};
use std::sync::Arc;

/// `list_<category>`: every known path, one per line.
pub struct ListTool {
    name: String,
    description: String,
    corpus: Arc<Corpus>,
}

impl ListTool {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        let category = corpus.category();
        Self {
            name: format!("list_{}", category.plural_slug()),
            description: format!(
                "List all available {} by path.",
                category.collection_label()
            ),
            corpus,
        }
    }
}

impl Tool for ListTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    fn invoke(&self, _args: Value) -> Result<String, ToolError> {
        Ok(list_paths(&self.corpus))
    }
}

/// Sorted `- <path>` lines, or a "none available" message.
pub fn list_paths(corpus: &Corpus) -> String {
    if corpus.is_empty() {
        return format!("No {} available.", corpus.category().collection_label());
    }

    let mut paths: Vec<&str> = corpus.paths().iter().map(String::as_str).collect();
    paths.sort_unstable();

    paths
        .iter()
        .map(|p| format!("- {}", p))
        .collect::<Vec<_>>()
        .join("\n")
}

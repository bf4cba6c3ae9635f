//! Read-by-name with forgiving name resolution.
//!
//! Resolution stops at the first stage that matches:
//! 1. exact path
//! 2. case-insensitive partial match (path contains the name, or the name
//!    equals the filename stem); more than one match is refused with a
//!    disambiguation list rather than guessing
//! 3. not found, with up to N "did you mean" suggestions

use crate::error::ToolError;
use crate::index::Corpus;
use crate::tools::Tool;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ReadArgs {
    #[serde(default)]
    name: Option<String>,
}

/// Outcome of resolving a name against a corpus.
#[derive(Debug, PartialEq)]
pub enum Resolution<'a> {
    /// Exact or unique partial match: `(path, text)`.
    Found(&'a str, &'a str),
    Ambiguous(Vec<&'a str>),
    NotFound { suggestions: Vec<&'a str> },
}

/// `read_<category>`: fetch one document by path or filename.
pub struct ReadTool {
    name: String,
    description: String,
    corpus: Arc<Corpus>,
    suggestion_limit: usize,
}

impl ReadTool {
    pub fn new(corpus: Arc<Corpus>, suggestion_limit: usize) -> Self {
        let category = corpus.category();
        Self {
            name: format!("read_{}", category.singular_slug()),
            description: format!(
                "Read a {} by path or filename. Accepts the full path from list_{}, \
                 or a case-insensitive partial name.",
                category.singular_slug(),
                category.plural_slug()
            ),
            corpus,
            suggestion_limit,
        }
    }
}

impl Tool for ReadTool {
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
                "name": {
                    "type": "string",
                    "description": "Path (e.g. \"feed.md\") or filename without extension"
                }
            },
            "required": ["name"]
        })
    }

    fn invoke(&self, args: Value) -> Result<String, ToolError> {
        let args: ReadArgs = serde_json::from_value(args)?;
        let name = args.name.as_deref().map(str::trim).unwrap_or("");
        if name.is_empty() {
            return Ok("Error: name is required".to_string());
        }

        let category = self.corpus.category();
        let message = match resolve(&self.corpus, name, self.suggestion_limit) {
            Resolution::Found(path, text) => {
                tracing::debug!(%category, path, "Document resolved");
                text.to_string()
            }
            Resolution::Ambiguous(paths) => format!(
                "Multiple {} match \"{}\":\n{}\n\nPlease call {} again with the full path.",
                category.plural_slug(),
                name,
                bullet_list(&paths),
                self.name
            ),
            Resolution::NotFound { suggestions } if suggestions.is_empty() => format!(
                "{} not found: {}. Use list_{} to see what is available.",
                category.item_label(),
                name,
                category.plural_slug()
            ),
            Resolution::NotFound { suggestions } => format!(
                "{} not found: {}\n\nDid you mean:\n{}",
                category.item_label(),
                name,
                bullet_list(&suggestions)
            ),
        };
        Ok(message)
    }
}

/// Resolve `query` to a document.
pub fn resolve<'a>(corpus: &'a Corpus, query: &str, suggestion_limit: usize) -> Resolution<'a> {
    if let Some((path, text)) = corpus.get_entry(query) {
        return Resolution::Found(path, text);
    }

    let needle = query.to_lowercase();

    let matches: Vec<(&str, &str)> = corpus
        .documents()
        .filter(|(path, _)| {
            let key = path.to_lowercase();
            key.contains(&needle) || file_stem(&key) == needle
        })
        .collect();

    match matches.as_slice() {
        [(path, text)] => return Resolution::Found(*path, *text),
        [] => {}
        _ => return Resolution::Ambiguous(matches.iter().map(|(path, _)| *path).collect()),
    }

    let suggestions = corpus
        .paths()
        .iter()
        .map(String::as_str)
        .filter(|path| {
            let key = path.to_lowercase();
            let stem = file_stem(&key);
            key.contains(&needle) || (!stem.is_empty() && needle.contains(stem))
        })
        .take(suggestion_limit)
        .collect();

    Resolution::NotFound { suggestions }
}

/// Final path segment without its extension.
fn file_stem(path: &str) -> &str {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rfind('.') {
        Some(0) | None => file,
        Some(dot) => &file[..dot],
    }
}

fn bullet_list(paths: &[&str]) -> String {
    paths
        .iter()
        .map(|p| format!("- {}", p))
        .collect::<Vec<_>>()
        .join("\n")
}

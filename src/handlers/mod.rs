pub mod list;
pub mod read;
pub mod search;

pub use list::ListTool;
pub use read::{resolve, ReadTool, Resolution};
pub use search::SearchTool;

use crate::index::Corpus;
use crate::tools::ToolRegistry;
use std::sync::Arc;

/// Register `list_*`, `read_*` and `search_*` for one corpus.
pub fn register_corpus_tools(
    registry: &mut ToolRegistry,
    corpus: &Arc<Corpus>,
    search_limit: usize,
    suggestion_limit: usize,
) {
    registry.register(ListTool::new(Arc::clone(corpus)));
    registry.register(ReadTool::new(Arc::clone(corpus), suggestion_limit));
    registry.register(SearchTool::new(Arc::clone(corpus), search_limit));
}

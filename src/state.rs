use crate::config::Config;
use crate::error::LoadError;
use crate::handlers::register_corpus_tools;
use crate::index::Corpus;
use crate::ingestion::{load_archive, ContentCategory, LoadedContent};
use crate::tools::ToolRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Application state shared across all request tasks.
///
/// Everything here is built before the first request is read and is never
/// mutated afterwards, apart from the lifecycle flag.
pub struct AppState {
    pub recipes: Arc<Corpus>,
    pub docs: Arc<Corpus>,
    pub registry: ToolRegistry,
    pub config: Arc<Config>,
    /// Archive fingerprint, for diagnostics.
    pub fingerprint: String,
    /// Set once the client has sent `initialize`. Informational only:
    /// requests are served whether or not it is set.
    initialized: AtomicBool,
}

impl AppState {
    /// Load the archive named in `config` and build corpora and tools.
    ///
    /// # Errors
    /// Any [`LoadError`]; there is no partial-content fallback.
    pub fn new(config: Config) -> Result<Self, LoadError> {
        let content = load_archive(&config.archive_path)?;
        Ok(Self::from_content(config, content))
    }

    /// Build state from already-extracted content.
    pub fn from_content(config: Config, content: LoadedContent) -> Self {
        let start = std::time::Instant::now();

        let LoadedContent {
            recipes,
            docs,
            fingerprint,
        } = content;

        let recipes = Arc::new(Corpus::build(ContentCategory::Recipe, recipes));
        let docs = Arc::new(Corpus::build(ContentCategory::Doc, docs));

        let mut registry = ToolRegistry::new();
        for corpus in [&recipes, &docs] {
            register_corpus_tools(
                &mut registry,
                corpus,
                config.search_limit,
                config.suggestion_limit,
            );
        }

        tracing::info!(
            recipes = recipes.len(),
            docs = docs.len(),
            tools = registry.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Corpora indexed and tools registered"
        );

        Self {
            recipes,
            docs,
            registry,
            config: Arc::new(config),
            fingerprint,
            initialized: AtomicBool::new(false),
        }
    }

    /// Record that `initialize` was received. Returns `true` if it had
    /// already been received before.
    pub fn mark_initialized(&self) -> bool {
        self.initialized.swap(true, Ordering::SeqCst)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::ContentItem;

    fn content() -> LoadedContent {
        let mut content = LoadedContent::default();
        content.insert(
            ContentCategory::Recipe,
            ContentItem::new("feed.md", "Building a feed"),
        );
        content
    }

    #[test]
    fn test_registers_six_tools_in_order() {
        let state = AppState::from_content(Config::with_defaults("unused"), content());
        assert_eq!(
            state.registry.names(),
            vec![
                "list_recipes",
                "read_recipe",
                "search_recipes",
                "list_docs",
                "read_doc",
                "search_docs"
            ]
        );
    }

    #[test]
    fn test_corpora_by_category() {
        let state = AppState::from_content(Config::with_defaults("unused"), content());
        assert_eq!(state.recipes.len(), 1);
        assert!(state.docs.is_empty());
        assert!(!state.docs.has_index());
    }

    #[test]
    fn test_initialized_flag() {
        let state = AppState::from_content(Config::with_defaults("unused"), content());
        assert!(!state.is_initialized());
        assert!(!state.mark_initialized());
        assert!(state.mark_initialized());
        assert!(state.is_initialized());
    }

    #[test]
    fn test_missing_archive_fails() {
        let result = AppState::new(Config::with_defaults("/no/such/archive.tar.gz"));
        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }
}

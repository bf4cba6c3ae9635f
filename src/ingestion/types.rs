//! Type definitions for the ingestion module.

use serde::Serialize;
use std::collections::BTreeMap;

/// Which collection a document belongs to, decided by its archive root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Recipe,
    Doc,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 2] = [ContentCategory::Recipe, ContentCategory::Doc];

    /// Archive folder (with trailing slash) that holds this category.
    pub const fn archive_root(self) -> &'static str {
        match self {
            Self::Recipe => "recipes/",
            Self::Doc => "api-docs/",
        }
    }

    /// Classify an archive entry name, returning the category and the
    /// entry path with the root stripped.
    pub fn classify(entry_name: &str) -> Option<(Self, &str)> {
        let name = entry_name.trim_start_matches("./");
        Self::ALL.into_iter().find_map(|category| {
            name.strip_prefix(category.archive_root())
                .filter(|rest| !rest.is_empty())
                .map(|rest| (category, rest))
        })
    }

    /// Suffix used in tool names (`list_recipes`, `read_doc`, ...).
    pub const fn plural_slug(self) -> &'static str {
        match self {
            Self::Recipe => "recipes",
            Self::Doc => "docs",
        }
    }

    pub const fn singular_slug(self) -> &'static str {
        match self {
            Self::Recipe => "recipe",
            Self::Doc => "doc",
        }
    }

    /// Capitalized noun for a single item, used in messages.
    pub const fn item_label(self) -> &'static str {
        match self {
            Self::Recipe => "Recipe",
            Self::Doc => "Documentation",
        }
    }

    /// Lowercase noun for the collection, used in messages.
    pub const fn collection_label(self) -> &'static str {
        match self {
            Self::Recipe => "recipes",
            Self::Doc => "documentation",
        }
    }
}

impl std::fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.plural_slug())
    }
}

/// A single text document extracted from the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    /// Archive-relative path with the category root stripped.
    pub path: String,
    pub text: String,
}

impl ContentItem {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Everything extracted from one archive, split by category.
///
/// Maps are keyed by path, so a later entry with the same path replaces
/// an earlier one and iteration is always in lexical path order.
#[derive(Debug, Default, Clone)]
pub struct LoadedContent {
    pub recipes: BTreeMap<String, String>,
    pub docs: BTreeMap<String, String>,
    /// Hex SHA-256 of the raw archive bytes.
    pub fingerprint: String,
}

impl LoadedContent {
    pub fn insert(&mut self, category: ContentCategory, item: ContentItem) {
        self.collection_mut(category).insert(item.path, item.text);
    }

    fn collection_mut(&mut self, category: ContentCategory) -> &mut BTreeMap<String, String> {
        match category {
            ContentCategory::Recipe => &mut self.recipes,
            ContentCategory::Doc => &mut self.docs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_recognized_roots() {
        assert_eq!(
            ContentCategory::classify("recipes/feed.md"),
            Some((ContentCategory::Recipe, "feed.md"))
        );
        assert_eq!(
            ContentCategory::classify("./api-docs/nip/zap.md"),
            Some((ContentCategory::Doc, "nip/zap.md"))
        );
    }

    #[test]
    fn test_classify_rejects_other_roots() {
        assert_eq!(ContentCategory::classify("docs/zap.md"), None);
        assert_eq!(ContentCategory::classify("README.md"), None);
        assert_eq!(ContentCategory::classify("recipes/"), None);
        assert_eq!(ContentCategory::classify("my-recipes/feed.md"), None);
    }

    #[test]
    fn test_later_insert_overwrites() {
        let mut content = LoadedContent::default();
        content.insert(ContentCategory::Recipe, ContentItem::new("a.md", "first"));
        content.insert(ContentCategory::Recipe, ContentItem::new("a.md", "second"));

        assert_eq!(content.recipes.len(), 1);
        assert_eq!(content.recipes["a.md"], "second");
        assert!(content.docs.is_empty());
    }
}

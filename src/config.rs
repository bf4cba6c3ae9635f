use std::env;
use std::path::PathBuf;

/// Protocol revision reported by `initialize` unless overridden.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

const DEFAULT_INSTRUCTIONS: &str = "Recipe and documentation server. \
Use list_recipes / list_docs to browse, read_recipe / read_doc to fetch a document \
by path or filename, and search_recipes / search_docs for keyword search.";

/// Log output format for the stderr subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match env::var("DOCPACK_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

pub struct Config {
    /// Path to the gzip tarball holding `recipes/` and `api-docs/`.
    pub archive_path: PathBuf,
    /// Maximum number of hits returned by the search tools.
    pub search_limit: usize,
    /// Maximum number of "did you mean" suggestions on a failed read.
    pub suggestion_limit: usize,
    pub protocol_version: String,
    pub server_name: String,
    pub instructions: Option<String>,
}

impl Config {
    /// Build configuration for the given archive, reading the rest from
    /// environment variables with sensible defaults.
    pub fn from_env(archive_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let search_limit: usize = env::var("DOCPACK_SEARCH_LIMIT")
            .unwrap_or_else(|_| "5".to_string())
            .parse()?;
        let suggestion_limit: usize = env::var("DOCPACK_SUGGESTION_LIMIT")
            .unwrap_or_else(|_| "3".to_string())
            .parse()?;

        if search_limit == 0 {
            anyhow::bail!("DOCPACK_SEARCH_LIMIT must be at least 1");
        }

        Ok(Self {
            archive_path: archive_path.into(),
            search_limit,
            suggestion_limit,
            protocol_version: env::var("DOCPACK_PROTOCOL_VERSION")
                .unwrap_or_else(|_| DEFAULT_PROTOCOL_VERSION.to_string()),
            server_name: env::var("DOCPACK_SERVER_NAME")
                .unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string()),
            instructions: Some(
                env::var("DOCPACK_INSTRUCTIONS")
                    .unwrap_or_else(|_| DEFAULT_INSTRUCTIONS.to_string()),
            ),
        })
    }

    /// Defaults without consulting the environment.
    pub fn with_defaults(archive_path: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
            search_limit: 5,
            suggestion_limit: 3,
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            server_name: env!("CARGO_PKG_NAME").to_string(),
            instructions: Some(DEFAULT_INSTRUCTIONS.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::with_defaults("content.tar.gz");
        assert_eq!(config.archive_path, PathBuf::from("content.tar.gz"));
        assert_eq!(config.search_limit, 5);
        assert_eq!(config.suggestion_limit, 3);
        assert_eq!(config.protocol_version, "2024-11-05");
        assert_eq!(config.server_name, "docpack-mcp");
        assert!(config.instructions.is_some());
    }
}

//! Ingestion module for the bundled content archive.
//!
//! This module decompresses the archive and splits its markdown/HTML
//! documents into the recipe and documentation collections.

pub mod archive;
pub mod types;

pub use archive::{load_archive, read_archive};
pub use types::{ContentCategory, ContentItem, LoadedContent};

//! Content archive loading.
//!
//! The archive is a gzip-compressed tarball (a plain tar stream is accepted
//! too) laid out as:
//!
//! ```text
//! recipes/<...>.md      -> ContentCategory::Recipe
//! api-docs/<...>.html   -> ContentCategory::Doc
//! ```
//!
//! Only markdown and HTML entries under those two roots are kept. Anything
//! else is skipped silently; a corrupt stream aborts the whole load.

use crate::error::LoadError;
use crate::ingestion::types::{ContentCategory, ContentItem, LoadedContent};
use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Extensions (lowercase, without dot) treated as text documents.
const TEXT_EXTENSIONS: &[&str] = &["md", "markdown", "html", "htm"];

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Load and categorize every text document in the archive at `path`.
///
/// # Errors
/// `LoadError::NotFound` if the path does not exist, `LoadError::Io` if it
/// cannot be read and `LoadError::Archive` if the stream is not a valid
/// (optionally gzipped) tar archive.
pub fn load_archive(path: &Path) -> Result<LoadedContent, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut content = read_archive(&bytes)?;
    content.fingerprint = fingerprint(&bytes);

    tracing::info!(
        path = %path.display(),
        size_bytes = bytes.len(),
        sha256 = %content.fingerprint,
        recipes = content.recipes.len(),
        docs = content.docs.len(),
        "Content archive loaded"
    );

    Ok(content)
}

/// Extract categorized documents from in-memory archive bytes.
pub fn read_archive(bytes: &[u8]) -> Result<LoadedContent, LoadError> {
    let reader: Box<dyn Read + '_> = if bytes.starts_with(&GZIP_MAGIC) {
        Box::new(GzDecoder::new(bytes))
    } else {
        Box::new(bytes)
    };

    let mut archive = tar::Archive::new(reader);
    let entries = archive.entries().map_err(archive_error)?;

    let mut content = LoadedContent::default();
    let mut skipped = 0usize;

    for entry in entries {
        let mut entry = entry.map_err(archive_error)?;

        if !entry.header().entry_type().is_file() {
            continue;
        }

        let name = match entry.path() {
            Ok(p) => p.to_string_lossy().into_owned(),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping entry with unreadable path");
                skipped += 1;
                continue;
            }
        };

        let Some((category, relative)) = ContentCategory::classify(&name) else {
            skipped += 1;
            continue;
        };

        if !has_text_extension(relative) {
            skipped += 1;
            continue;
        }

        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf).map_err(archive_error)?;

        match String::from_utf8(buf) {
            Ok(text) => content.insert(category, ContentItem::new(relative, text)),
            Err(_) => {
                tracing::warn!(entry = %name, "Skipping entry that is not valid UTF-8");
                skipped += 1;
            }
        }
    }

    tracing::debug!(
        recipes = content.recipes.len(),
        docs = content.docs.len(),
        skipped,
        "Archive extraction complete"
    );

    Ok(content)
}

fn has_text_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            TEXT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Hex-encoded SHA-256 of the archive bytes, logged so deployments can tell
/// which bundle a server is running.
fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

fn archive_error(err: std::io::Error) -> LoadError {
    LoadError::Archive(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn build_tar(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn gzip(bytes: &[u8]) -> Vec<u8> {
        use std::io::Write;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_reads_gzipped_tarball() {
        let bytes = gzip(&build_tar(&[
            ("recipes/feed.md", b"Building a feed"),
            ("api-docs/zap.html", b"<h1>Zaps</h1>"),
        ]));

        let content = read_archive(&bytes).unwrap();
        assert_eq!(content.recipes["feed.md"], "Building a feed");
        assert_eq!(content.docs["zap.html"], "<h1>Zaps</h1>");
    }

    #[test]
    fn test_reads_plain_tar() {
        let bytes = build_tar(&[("recipes/feed.md", b"Building a feed")]);
        let content = read_archive(&bytes).unwrap();
        assert_eq!(content.recipes.len(), 1);
    }

    #[test]
    fn test_skips_unrecognized_entries() {
        let bytes = gzip(&build_tar(&[
            ("recipes/image.png", &[0x89, 0x50, 0x4e, 0x47]),
            ("README.md", b"top level"),
            ("other/notes.md", b"elsewhere"),
            ("recipes/nested/deep.MD", b"kept"),
            ("api-docs/bad.md", &[0xff, 0xfe, 0x00]),
        ]));

        let content = read_archive(&bytes).unwrap();
        assert_eq!(content.recipes.len(), 1);
        assert_eq!(content.recipes["nested/deep.MD"], "kept");
        assert!(content.docs.is_empty());
    }

    #[test]
    fn test_corrupt_gzip_is_an_error() {
        let mut bytes = gzip(&build_tar(&[("recipes/feed.md", b"Building a feed")]));
        bytes.truncate(bytes.len() / 2);

        assert!(matches!(read_archive(&bytes), Err(LoadError::Archive(_))));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let result = load_archive(Path::new("/definitely/not/here.tar.gz"));
        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }

    #[test]
    fn test_load_records_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.tar.gz");
        std::fs::write(&path, gzip(&build_tar(&[("recipes/a.md", b"a")]))).unwrap();

        let content = load_archive(&path).unwrap();
        assert_eq!(content.fingerprint.len(), 64);
        assert!(content.fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_has_text_extension() {
        assert!(has_text_extension("a.md"));
        assert!(has_text_extension("dir/a.HTML"));
        assert!(has_text_extension("a.htm"));
        assert!(!has_text_extension("a.txt"));
        assert!(!has_text_extension("Makefile"));
    }
}

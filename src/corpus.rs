//! Corpus loading for reindexing: either a JSON array of documents or a
//! directory tree scanned into document metadata.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use walkdir::WalkDir;

use crate::models::{Document, DocumentUpsert};

/// Characters of file content kept as the summary.
const SUMMARY_HEAD_CHARS: usize = 500;

/// Files larger than this are indexed from metadata only.
const MAX_CONTENT_BYTES: u64 = 1_000_000;

/// Load documents from the configured corpus source.
pub fn load_corpus(path: &Path) -> Result<Vec<DocumentUpsert>> {
    if path.is_dir() {
        Ok(scan_dir(path))
    } else {
        load_json(path)
    }
}

fn load_json(path: &Path) -> Result<Vec<DocumentUpsert>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Corpus file {} is not a JSON document array", path.display()))
}

/// Walk a directory tree and build document metadata per file: the file
/// name, its extension as file type, the top-level directory as category,
/// the modification time, and the head of readable text content as summary.
/// The relative path becomes the document id so rescans upsert in place.
pub fn scan_dir(root: &Path) -> Vec<DocumentUpsert> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(doc) = document_from_file(root, entry.path()) {
            documents.push(doc);
        }
    }

    tracing::info!("scanned {} documents under {}", documents.len(), root.display());
    documents
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn document_from_file(root: &Path, path: &Path) -> Option<DocumentUpsert> {
    let relative = path.strip_prefix(root).ok()?;
    let name = path.file_name()?.to_string_lossy().to_string();

    let file_type = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "unknown".to_string());

    // First path component under the root, when the file sits in one.
    let category = relative
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .and_then(|p| p.components().next())
        .map(|c| c.as_os_str().to_string_lossy().to_string());

    let metadata = path.metadata().ok()?;
    let updated_at: DateTime<Utc> = metadata
        .modified()
        .map(DateTime::from)
        .unwrap_or_else(|_| Utc::now());

    let summary = if metadata.len() <= MAX_CONTENT_BYTES {
        std::fs::read_to_string(path)
            .map(|content| head(&content, SUMMARY_HEAD_CHARS))
            .unwrap_or_default()
    } else {
        String::new()
    };

    Some(DocumentUpsert {
        id: Some(relative.to_string_lossy().to_string()),
        fields: Document {
            name,
            summary,
            keywords: Vec::new(),
            category,
            file_type,
            updated_at,
        },
    })
}

fn head(content: &str, max_chars: usize) -> String {
    content.chars().take(max_chars).collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_builds_metadata_from_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("tutorials")).unwrap();
        std::fs::write(
            dir.path().join("tutorials/intro.md"),
            "# Intro\n\nGetting started.",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "loose notes").unwrap();

        let mut docs = scan_dir(dir.path());
        docs.sort_by(|a, b| a.fields.name.cmp(&b.fields.name));
        assert_eq!(docs.len(), 2);

        let intro = &docs[0];
        assert_eq!(intro.fields.name, "intro.md");
        assert_eq!(intro.fields.file_type, "md");
        assert_eq!(intro.fields.category.as_deref(), Some("tutorials"));
        assert_eq!(intro.id.as_deref(), Some("tutorials/intro.md"));
        assert!(intro.fields.summary.starts_with("# Intro"));

        let notes = &docs[1];
        assert!(notes.fields.category.is_none());
        assert_eq!(notes.fields.file_type, "txt");
    }

    #[test]
    fn test_hidden_entries_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".secret"), "hidden").unwrap();
        std::fs::write(dir.path().join("visible.txt"), "shown").unwrap();

        let docs = scan_dir(dir.path());
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].fields.name, "visible.txt");
    }

    #[test]
    fn test_json_corpus_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"[{"id": "a", "name": "a.pdf", "file_type": "pdf",
                 "updated_at": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let docs = load_corpus(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id.as_deref(), Some("a"));
    }

    #[test]
    fn test_malformed_json_corpus_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_corpus(&path).is_err());
    }
}

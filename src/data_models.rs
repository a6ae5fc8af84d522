use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::{PrepError, SkipReason};

pub const DOCUMENT_EXTENSION: &str = "txt";

/// A raw input file. Its id is the file name with the extension stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub id: String,
    pub path: PathBuf,
}

impl RawDocument {
    pub fn from_path(path: PathBuf) -> Option<RawDocument> {
        let id = path.file_stem()?.to_string_lossy().into_owned();
        if id.is_empty() {
            return None;
        }
        Some(RawDocument { id, path })
    }

    pub async fn read(&self) -> Result<String, PrepError> {
        read_document(&self.id, &self.path).await
    }
}

/// A document after normalization and reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    pub id: String,
    pub tokens: Vec<String>,
}

impl NormalizedDocument {
    pub fn new(id: String, tokens: Vec<String>) -> Self {
        Self { id, tokens }
    }

    /// Space-joined form, as persisted.
    pub fn content(&self) -> String {
        self.tokens.join(" ")
    }

    /// Character length of [`NormalizedDocument::content`].
    pub fn char_len(&self) -> usize {
        let chars: usize = self.tokens.iter().map(|t| t.chars().count()).sum();
        chars + self.tokens.len().saturating_sub(1)
    }
}

/// Enumerates the raw documents of `dir` in file name order.
///
/// Files whose ids collide with an earlier file are returned separately so the
/// caller can report them.
pub async fn list_raw_documents(dir: &Path) -> Result<(Vec<RawDocument>, Vec<PrepError>)> {
    let mut paths = Vec::new();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        if file_type.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut seen = HashSet::new();
    let mut documents = Vec::with_capacity(paths.len());
    let mut duplicates = Vec::new();
    for path in paths {
        let Some(doc) = RawDocument::from_path(path) else {
            continue;
        };
        if seen.insert(doc.id.clone()) {
            documents.push(doc);
        } else {
            duplicates.push(PrepError::skip(
                doc.id,
                SkipReason::DuplicateId {
                    path: doc.path.display().to_string(),
                },
            ));
        }
    }
    Ok((documents, duplicates))
}

/// A directory of normalized documents, stored as `<id>.txt`, in a fixed
/// enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSet {
    dir: PathBuf,
    ids: Vec<String>,
}

impl DocumentSet {
    pub fn new(dir: PathBuf, ids: Vec<String>) -> Self {
        Self { dir, ids }
    }

    /// Every `.txt` document in `dir`, ordered by file name.
    pub async fn open(dir: &Path) -> Result<Self> {
        let mut ids = Vec::new();
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to list {}", dir.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                ids.push(stem.to_string_lossy().into_owned());
            }
        }
        ids.sort();
        Ok(Self::new(dir.to_path_buf(), ids))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn path_of(&self, id: &str) -> PathBuf {
        document_path(&self.dir, id)
    }

    pub async fn read(&self, id: &str) -> Result<String, PrepError> {
        read_document(id, &self.path_of(id)).await
    }

    pub async fn write(&self, id: &str, content: &str) -> Result<(), PrepError> {
        tokio::fs::write(self.path_of(id), content).await?;
        Ok(())
    }
}

pub fn document_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.{DOCUMENT_EXTENSION}"))
}

/// Reads a document as UTF-8, dropping undecodable bytes.
pub async fn read_document(id: &str, path: &Path) -> Result<String, PrepError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        PrepError::skip(
            id,
            SkipReason::Unreadable {
                detail: e.to_string(),
            },
        )
    })?;
    Ok(decode_ignoring_invalid(&bytes))
}

pub fn decode_ignoring_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}

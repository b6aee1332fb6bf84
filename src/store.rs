//! Per-author article queue and the excluded-author list.
//!
//! Queues live at `<data_dir>/<author>/articles.json`. Every save replaces the
//! file atomically so an interrupted run leaves the last complete queue behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

const QUEUE_FILE: &str = "articles.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("corrupt queue file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not replace {path}: {reason}")]
    Persist { path: PathBuf, reason: String },
}

/// One article of an author and whether it has been handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    identifier: String,
    engaged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    engaged_at: Option<DateTime<Utc>>,
}

impl ArticleRecord {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            engaged: false,
            engaged_at: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn engaged_at(&self) -> Option<DateTime<Utc>> {
        self.engaged_at
    }
}

/// Ordered, identifier-unique records for one author.
///
/// Grows by append only; `engaged` flips false → true and never back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleQueue {
    records: Vec<ArticleRecord>,
}

impl ArticleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ArticleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.records.iter().any(|r| r.identifier == identifier)
    }

    /// Append a fresh, unengaged record. Returns `false` for a known identifier.
    pub fn push(&mut self, identifier: impl Into<String>) -> bool {
        let identifier = identifier.into();
        if self.contains(&identifier) {
            return false;
        }
        self.records.push(ArticleRecord::new(identifier));
        true
    }

    /// Append records in order, skipping known identifiers. Returns how many were added.
    pub fn extend<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = ArticleRecord>,
    {
        records
            .into_iter()
            .filter(|record| self.push(record.identifier.clone()))
            .count()
    }

    /// Positions of records still waiting for engagement, in queue order.
    pub fn pending(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.engaged)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.records.iter().filter(|r| !r.engaged).count()
    }

    /// Mark the record at `index` as engaged. Already-engaged records keep
    /// their original timestamp.
    pub fn mark_engaged(&mut self, index: usize, at: DateTime<Utc>) -> bool {
        match self.records.get_mut(index) {
            Some(record) if !record.engaged => {
                record.engaged = true;
                record.engaged_at = Some(at);
                true
            }
            _ => false,
        }
    }
}

impl FromIterator<ArticleRecord> for ArticleQueue {
    fn from_iter<I: IntoIterator<Item = ArticleRecord>>(iter: I) -> Self {
        let mut queue = ArticleQueue::new();
        queue.extend(iter);
        queue
    }
}

/// File-backed queue persistence, one directory per author.
#[derive(Debug, Clone)]
pub struct QueueStore {
    data_dir: PathBuf,
}

impl QueueStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn queue_path(&self, author: &str) -> PathBuf {
        self.data_dir.join(author).join(QUEUE_FILE)
    }

    /// `Ok(None)` when this author has never been discovered.
    pub fn load(&self, author: &str) -> Result<Option<ArticleQueue>, StoreError> {
        let path = self.queue_path(author);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    pub fn save(&self, author: &str, queue: &ArticleQueue) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(queue)?;
        write_atomic(&self.queue_path(author), json.as_bytes())
    }
}

/// Write `contents` to a sibling temp file, fsync it, then rename over `path`.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Persist {
        path: path.to_path_buf(),
        reason: e.error.to_string(),
    })?;
    Ok(())
}

/// Authors that must never be engaged, read from `identifier,displayName` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedAuthors {
    entries: Vec<(String, String)>,
}

impl ExcludedAuthors {
    /// A missing file means nobody is excluded.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Self::parse(&contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no excluded-author list");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(contents: &str) -> Self {
        let entries = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| match line.split_once(',') {
                Some((id, name)) => (id.trim().to_string(), name.trim().to_string()),
                None => (line.to_string(), String::new()),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Match on the `@handle` key space used by profile markup.
    pub fn contains_identifier(&self, identifier: &str) -> bool {
        self.entries.iter().any(|(id, _)| id == identifier)
    }

    /// Match on the display-name key space used by the feed.
    pub fn contains_name(&self, name: &str) -> bool {
        !name.is_empty() && self.entries.iter().any(|(_, n)| n == name)
    }
}

//! Document persistence for session records
//!
//! A session document is written exactly once, atomically, keyed by the
//! session date. Re-running a session for the same date overwrites the
//! prior document; there are no partial or append writes.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use triage_core::{Result, TriageError};

/// Trait for persisting session documents (allows mocking in tests)
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persist the rendered document for the given session date
    ///
    /// Overwrites any prior document at that identifier and returns the
    /// location written.
    async fn persist(&self, date: NaiveDate, body: &str) -> Result<PathBuf>;
}

/// Filesystem-backed document store
///
/// Writes `triage-review-<date>.md` under the configured root via a
/// temp-file rename so readers never observe a half-built document.
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Final path for a session date's document
    pub fn document_path(&self, date: NaiveDate) -> PathBuf {
        self.root.join(format!("triage-review-{}.md", date))
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn persist(&self, date: NaiveDate, body: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| TriageError::Store(format!("failed to create {:?}: {}", self.root, e)))?;

        let path = self.document_path(date);
        let tmp = self.root.join(format!(".triage-review-{}.md.tmp", date));

        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| TriageError::Store(format!("failed to write {:?}: {}", tmp, e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| TriageError::Store(format!("failed to rename into {:?}: {}", path, e)))?;

        info!("Persisted session document to {:?}", path);
        Ok(path)
    }
}

/// In-memory document store for testing
///
/// Records every persisted document and can be told to fail.
#[derive(Default)]
pub struct MemoryDocumentStore {
    writes: Mutex<Vec<(NaiveDate, String)>>,
    fail: bool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// All documents persisted so far
    pub fn writes(&self) -> Vec<(NaiveDate, String)> {
        self.writes.lock().expect("writes lock poisoned").clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().expect("writes lock poisoned").len()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn persist(&self, date: NaiveDate, body: &str) -> Result<PathBuf> {
        if self.fail {
            return Err(TriageError::Store("store rejected write".to_string()));
        }
        self.writes
            .lock()
            .expect("writes lock poisoned")
            .push((date, body.to_string()));
        Ok(Path::new("memory").join(format!("triage-review-{}.md", date)))
    }
}

//! Tracking-platform abstraction
//!
//! The trait splits the read surface (search, fetch) from the write
//! surface (labels, comments). Reads never mutate platform state; each
//! write call reports success or failure independently per issue.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use triage_core::{CandidateRecord, IssueSnapshot, Priority, Result, TriageError};

/// Trait for tracking-platform access (allows mocking in tests)
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Search the backlog for open, non-PR candidate issues
    ///
    /// Returns up to `limit` lightweight records with engagement
    /// metrics. Fails with `SourceUnavailable` once the internal retry
    /// budget is exhausted.
    async fn search_candidates(&self, backlog: &str, limit: usize)
        -> Result<Vec<CandidateRecord>>;

    /// Fetch the full content of one issue
    async fn fetch_issue(&self, backlog: &str, number: u64) -> Result<IssueSnapshot>;

    /// Replace any existing priority label with the given one
    async fn set_priority_label(
        &self,
        backlog: &str,
        number: u64,
        priority: Priority,
    ) -> Result<()>;

    /// Add the ready-for-contribution label
    async fn add_ready_label(&self, backlog: &str, number: u64) -> Result<()>;

    /// Post a summary comment on the issue
    async fn post_comment(&self, backlog: &str, number: u64, body: &str) -> Result<()>;
}

/// A write operation recorded by [`MockTracker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Priority { number: u64, priority: Priority },
    ReadyLabel { number: u64 },
    Comment { number: u64 },
}

/// Mock tracker for testing
///
/// Serves a configured candidate pool and issue map, records every
/// write, and can be told to fail retrieval, specific fetches, or
/// specific write-backs.
#[derive(Default)]
pub struct MockTracker {
    candidates: Vec<CandidateRecord>,
    issues: HashMap<u64, IssueSnapshot>,
    search_unavailable: bool,
    fetch_failures: HashSet<u64>,
    write_failures: HashSet<u64>,
    writes: Mutex<Vec<WriteOp>>,
}

impl MockTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a full issue; a matching candidate record is derived from it
    pub fn with_issue(mut self, snapshot: IssueSnapshot) -> Self {
        self.candidates.push(CandidateRecord {
            number: snapshot.number,
            title: snapshot.title.clone(),
            url: snapshot.url.clone(),
            labels: snapshot.labels.clone(),
            created_at: snapshot.created_at,
            comment_count: snapshot.comment_count,
            reaction_count: snapshot.reaction_count,
            is_pull_request: snapshot.is_pull_request,
            has_parent: false,
        });
        self.issues.insert(snapshot.number, snapshot);
        self
    }

    /// Add a candidate record without full content (fetch will fail)
    pub fn with_candidate(mut self, record: CandidateRecord) -> Self {
        self.candidates.push(record);
        self
    }

    /// Make `search_candidates` fail with `SourceUnavailable`
    pub fn with_search_unavailable(mut self) -> Self {
        self.search_unavailable = true;
        self
    }

    /// Make `fetch_issue` fail for the given issue number
    pub fn with_fetch_failure(mut self, number: u64) -> Self {
        self.fetch_failures.insert(number);
        self
    }

    /// Make every write call fail for the given issue number
    pub fn with_write_failure(mut self, number: u64) -> Self {
        self.write_failures.insert(number);
        self
    }

    /// All writes recorded so far, in call order
    pub fn writes(&self) -> Vec<WriteOp> {
        self.writes.lock().expect("writes lock poisoned").clone()
    }

    fn record_write(&self, backlog: &str, op: WriteOp) -> Result<()> {
        let number = match &op {
            WriteOp::Priority { number, .. }
            | WriteOp::ReadyLabel { number }
            | WriteOp::Comment { number } => *number,
        };
        if self.write_failures.contains(&number) {
            return Err(TriageError::Tracker(format!(
                "write rejected for {}#{}",
                backlog, number
            )));
        }
        self.writes.lock().expect("writes lock poisoned").push(op);
        Ok(())
    }
}

#[async_trait]
impl IssueTracker for MockTracker {
    async fn search_candidates(
        &self,
        backlog: &str,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>> {
        if self.search_unavailable {
            return Err(TriageError::SourceUnavailable(format!(
                "backlog {} unreachable after retries",
                backlog
            )));
        }
        Ok(self.candidates.iter().take(limit).cloned().collect())
    }

    async fn fetch_issue(&self, backlog: &str, number: u64) -> Result<IssueSnapshot> {
        if self.fetch_failures.contains(&number) {
            return Err(TriageError::Tracker(format!(
                "fetch failed for {}#{}",
                backlog, number
            )));
        }
        self.issues
            .get(&number)
            .cloned()
            .ok_or_else(|| TriageError::Tracker(format!("issue {}#{} not found", backlog, number)))
    }

    async fn set_priority_label(
        &self,
        backlog: &str,
        number: u64,
        priority: Priority,
    ) -> Result<()> {
        self.record_write(backlog, WriteOp::Priority { number, priority })
    }

    async fn add_ready_label(&self, backlog: &str, number: u64) -> Result<()> {
        self.record_write(backlog, WriteOp::ReadyLabel { number })
    }

    async fn post_comment(&self, backlog: &str, number: u64, _body: &str) -> Result<()> {
        self.record_write(backlog, WriteOp::Comment { number })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(number: u64) -> IssueSnapshot {
        let now = Utc::now();
        IssueSnapshot {
            number,
            title: format!("Issue {}", number),
            url: format!("https://example.com/issues/{}", number),
            body: "A body.".to_string(),
            labels: vec![],
            linked: vec![],
            is_pull_request: false,
            comment_count: 0,
            reaction_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_mock_serves_candidates_and_issues() {
        let tracker = MockTracker::new().with_issue(snapshot(1)).with_issue(snapshot(2));

        let candidates = tracker.search_candidates("acme/widgets", 10).await.unwrap();
        assert_eq!(candidates.len(), 2);

        let issue = tracker.fetch_issue("acme/widgets", 2).await.unwrap();
        assert_eq!(issue.number, 2);
    }

    #[tokio::test]
    async fn test_mock_search_unavailable() {
        let tracker = MockTracker::new().with_search_unavailable();
        let err = tracker
            .search_candidates("acme/widgets", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, TriageError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_mock_records_writes_and_failures() {
        let tracker = MockTracker::new()
            .with_issue(snapshot(1))
            .with_write_failure(2);

        tracker
            .set_priority_label("acme/widgets", 1, Priority::Medium)
            .await
            .unwrap();
        assert!(tracker
            .set_priority_label("acme/widgets", 2, Priority::Low)
            .await
            .is_err());

        let writes = tracker.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(
            writes[0],
            WriteOp::Priority {
                number: 1,
                priority: Priority::Medium
            }
        );
    }
}

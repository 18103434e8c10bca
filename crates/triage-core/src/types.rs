//! Core type definitions for triage review sessions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Label applied to issues that are ready for community contribution
pub const READY_LABEL: &str = "ready for contribution";

/// The platform label strings for the four priority levels
pub const PRIORITY_LABELS: [&str; 4] = ["High", "Medium-High", "Medium", "Low"];

/// Issue priority levels
///
/// A closed set: every classified issue lands on exactly one of these.
/// Ordering is by severity (High sorts first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    High = 0,
    MediumHigh = 1,
    Medium = 2,
    Low = 3,
}

impl Priority {
    /// The label string used on the tracking platform
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::MediumHigh => "Medium-High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Whether this priority is more severe than `other`
    pub fn is_above(&self, other: Priority) -> bool {
        self < &other
    }

    /// The adjacent lower-severity level, if any
    pub fn step_down(&self) -> Priority {
        match self {
            Self::High => Self::MediumHigh,
            Self::MediumHigh => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium-high" | "medium_high" | "mediumhigh" => Ok(Self::MediumHigh),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// Issue category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Bug,
    Feature,
    Tool,
    Documentation,
    #[default]
    Other,
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bug => write!(f, "bug"),
            Self::Feature => write!(f, "feature"),
            Self::Tool => write!(f, "tool"),
            Self::Documentation => write!(f, "documentation"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bug" => Ok(Self::Bug),
            "feature" | "enhancement" => Ok(Self::Feature),
            "tool" | "tools" => Ok(Self::Tool),
            "documentation" | "docs" => Ok(Self::Documentation),
            "other" => Ok(Self::Other),
            _ => Err(format!("Invalid issue type: {}", s)),
        }
    }
}

/// Terminal status of a review session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session still being driven by the orchestrator
    InProgress,
    /// All requested issues analyzed and all write-backs applied
    Completed,
    /// Valid terminal state: fewer issues than requested, or recorded
    /// per-issue failures
    PartialCompletion,
    /// Fatal error before any document was written
    Failed,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "in progress"),
            Self::Completed => write!(f, "completed"),
            Self::PartialCompletion => write!(f, "partial completion"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Whether a label marks a priority level
///
/// Matches the four level names plus `priority:`-prefixed variants,
/// case-insensitively. Candidates carrying any of these are already
/// triaged and must be excluded from selection.
pub fn is_priority_label(label: &str) -> bool {
    let normalized = label.trim().to_lowercase();
    let stripped = normalized
        .strip_prefix("priority:")
        .or_else(|| normalized.strip_prefix("priority/"))
        .unwrap_or(&normalized)
        .trim();
    PRIORITY_LABELS
        .iter()
        .any(|p| p.to_lowercase() == stripped)
}

/// Lightweight candidate record returned by a backlog search
///
/// Carries only what candidate selection needs: identity, labels, and
/// engagement metrics. Full content is fetched per issue afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub comment_count: u32,
    pub reaction_count: u32,
    #[serde(default)]
    pub is_pull_request: bool,
    /// Subtasks of a tracked parent are skipped during selection
    #[serde(default)]
    pub has_parent: bool,
}

impl CandidateRecord {
    pub fn has_priority_label(&self) -> bool {
        self.labels.iter().any(|l| is_priority_label(l))
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(name))
    }
}

/// Raw issue snapshot as fetched from the tracking platform
///
/// Read-only once fetched; the analyzer derives the canonical [`Issue`]
/// from it without further network access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSnapshot {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub body: String,
    pub labels: Vec<String>,
    /// Issue/PR numbers cross-referenced from this issue
    #[serde(default)]
    pub linked: Vec<u64>,
    #[serde(default)]
    pub is_pull_request: bool,
    pub comment_count: u32,
    pub reaction_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Canonical issue record with fields derived by the analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub body: String,
    pub issue_type: IssueType,
    pub labels: Vec<String>,
    pub linked: Vec<u64>,
    /// Customer-impact statement extracted from the description
    pub customer_impact: Option<String>,
    /// Reproduction steps extracted from the description
    pub reproduction_steps: Option<String>,
    /// Proposed solution or patch extracted from the description
    pub proposed_solution: Option<String>,
    pub is_pull_request: bool,
    pub comment_count: u32,
    pub reaction_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(name))
    }
}

/// Derived assessment of a single issue
///
/// Created only after a completed analyzer pass; references exactly one
/// issue via [`ReviewedIssue`]. Readiness is true iff the
/// missing-information list is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Narrative context summary extracted from the issue
    pub summary: Vec<String>,
    pub priority: Priority,
    pub priority_reasoning: String,
    pub ready_for_contribution: bool,
    pub readiness_notes: String,
    pub missing_information: Vec<String>,
}

/// An issue paired with its assessment, in retrieval order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewedIssue {
    pub issue: Issue,
    pub assessment: Assessment,
}

/// A per-issue analysis failure, recorded and excluded from the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub number: u64,
    pub reason: String,
}

/// A per-issue write-back failure, recorded without aborting the rest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteBackFailure {
    pub number: u64,
    pub reason: String,
}

/// Requested parameters for a review session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionParams {
    /// Session identity; also the document identifier
    pub meeting_date: NaiveDate,
    pub max_issues: usize,
    /// Backlog source reference, `owner/repo`
    pub backlog: String,
    pub focus_area: Option<String>,
}

impl SessionParams {
    pub fn new(meeting_date: NaiveDate, max_issues: usize, backlog: impl Into<String>) -> Self {
        Self {
            meeting_date,
            max_issues,
            backlog: backlog.into(),
            focus_area: None,
        }
    }

    pub fn with_focus_area(mut self, focus_area: impl Into<String>) -> Self {
        self.focus_area = Some(focus_area.into());
        self
    }
}

/// A complete review session
///
/// Owned and mutated exclusively by the session orchestrator, persisted
/// exactly once by the report writer, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSession {
    pub params: SessionParams,
    /// Issues requested (`max_issues` at session start)
    pub requested_count: usize,
    /// Analyzed issues in retrieval order
    pub reviewed: Vec<ReviewedIssue>,
    /// Reason the session analyzed fewer issues than requested
    pub shortfall_reason: Option<String>,
    pub analysis_failures: Vec<AnalysisFailure>,
    pub write_back_failures: Vec<WriteBackFailure>,
    pub status: SessionStatus,
}

impl ReviewSession {
    pub fn new(params: SessionParams) -> Self {
        let requested_count = params.max_issues;
        Self {
            params,
            requested_count,
            reviewed: Vec::new(),
            shortfall_reason: None,
            analysis_failures: Vec::new(),
            write_back_failures: Vec::new(),
            status: SessionStatus::InProgress,
        }
    }

    pub fn analyzed_count(&self) -> usize {
        self.reviewed.len()
    }

    /// Number of analyzed issues that are ready for contribution
    pub fn ready_count(&self) -> usize {
        self.reviewed
            .iter()
            .filter(|r| r.assessment.ready_for_contribution)
            .count()
    }

    /// Counts by priority bucket, in severity order
    pub fn counts_by_priority(&self) -> [(Priority, usize); 4] {
        let count = |p: Priority| {
            self.reviewed
                .iter()
                .filter(|r| r.assessment.priority == p)
                .count()
        };
        [
            (Priority::High, count(Priority::High)),
            (Priority::MediumHigh, count(Priority::MediumHigh)),
            (Priority::Medium, count(Priority::Medium)),
            (Priority::Low, count(Priority::Low)),
        ]
    }
}

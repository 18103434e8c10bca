//! # triage-tracker
//!
//! Tracking-platform boundary for triage review sessions.
//!
//! The [`IssueTracker`] trait is the only seam through which issue data
//! enters or leaves the workspace. The GitHub implementation talks
//! GraphQL for reads and REST for label/comment writes, with a bounded
//! retry budget around every call. When the platform cannot be reached
//! after the budget is exhausted, retrieval fails with
//! `SourceUnavailable` and the session terminates; no synthetic issues
//! are ever substituted.
//!
//! Candidate selection (ordering, engagement scoring, dedup) is pure and
//! lives in [`selection`].

mod github;
pub mod selection;
mod tracker;

pub use github::GithubTracker;
pub use selection::{select, Selection, SelectedCandidate};
pub use tracker::{IssueTracker, MockTracker, WriteOp};

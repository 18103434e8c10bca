//! # triage-core
//!
//! Core types for the triage review-session engine.
//!
//! A review session turns an unordered backlog of tracked issues into a
//! prioritized, documented set of records. The pipeline is strictly
//! ordered: retrieval, analysis, classification, readiness assessment,
//! documentation, write-back. The types here encode the outcomes that
//! matter: what counts as High priority, when a session hard-fails, and
//! when it may proceed with partial data.
//!
//! ## Core rules
//!
//! - Issues are read-only snapshots fetched from the tracking platform;
//!   nothing in this workspace ever fabricates issue content.
//! - Every Assessment references exactly one Issue.
//! - A session that analyzes fewer issues than requested is a
//!   PartialCompletion with a recorded shortfall reason, never a silent
//!   success.

mod config;
mod error;
mod types;

pub use config::{RetryPolicy, SessionDefaults, TriageConfig};
pub use error::{Result, TriageError};
pub use types::*;

//! # triage-report
//!
//! Turns a finished review session into its durable record: a Markdown
//! document persisted exactly once per session, after all assessments
//! are computed and before any write-back. Also detects the cross-issue
//! patterns surfaced in the session summary.

mod patterns;
mod render;
mod store;

pub use patterns::{detect_patterns, SessionFindings, ThemeCount};
pub use render::render_markdown;
pub use store::{DocumentStore, FsDocumentStore, MemoryDocumentStore};

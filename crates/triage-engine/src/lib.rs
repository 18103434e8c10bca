//! # triage-engine
//!
//! The orchestration and classification core of a review session.
//!
//! A session is driven through a pure state machine ([`state`]) by the
//! [`SessionRunner`]: parameter validation, retrieval, per-issue
//! analysis/classification/readiness (fanned out, collected in retrieval
//! order), exactly-once documentation, then per-issue write-back. The
//! classifier and readiness assessor are pure decision functions over
//! structured inputs so every business rule is unit-testable.

mod analyzer;
mod classifier;
mod readiness;
mod session;
pub mod state;

pub use analyzer::{analyze, AnalyzedIssue};
pub use classifier::{classify, ClassifierInput, PriorityDecision};
pub use readiness::{assess_readiness, ReadinessVerdict};
pub use session::{SessionOutcome, SessionRunner};

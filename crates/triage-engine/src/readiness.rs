//! Contribution-readiness assessment
//!
//! A hard gate, not a weighted score: an issue is ready only when it has
//! a clear problem statement, enough context for an external contributor
//! with no private knowledge, a well-defined scope, and no dependency on
//! an unresolved maintainer decision. Any open design decision forces
//! the verdict to not-ready however well-written the issue is.

use crate::classifier::PriorityDecision;
use triage_core::{Issue, IssueType, Priority};

pub const GAP_PROBLEM_STATEMENT: &str = "clear problem statement";
pub const GAP_CONTEXT: &str = "sufficient context for an external contributor";
pub const GAP_SCOPE: &str = "well-defined scope";
pub const GAP_MAINTAINER_DECISION: &str = "maintainer decision";

/// Body length below which the problem statement is considered unclear
const MIN_PROBLEM_CHARS: usize = 60;

/// Body length above which context is assumed sufficient even without
/// reproduction steps or linked references
const MIN_CONTEXT_CHARS: usize = 160;

const OPEN_DECISION_MARKERS: [&str; 7] = [
    "maintainer decision",
    "design decision",
    "architectural decision",
    "architecture decision",
    "awaiting decision",
    "needs discussion",
    "not yet decided",
];

/// The assessor's output
#[derive(Debug, Clone)]
pub struct ReadinessVerdict {
    pub ready: bool,
    pub notes: String,
    /// Specific items blocking readiness; empty exactly when ready
    pub missing_information: Vec<String>,
}

fn has_open_decision(issue: &Issue) -> bool {
    let haystack = format!("{}\n{}", issue.title, issue.body).to_lowercase();
    OPEN_DECISION_MARKERS.iter().any(|m| haystack.contains(m))
}

/// Assess whether an issue is ready for community contribution
pub fn assess_readiness(issue: &Issue, decision: &PriorityDecision) -> ReadinessVerdict {
    let body = issue.body.trim();
    let mut missing = Vec::new();

    let clear_problem = !issue.title.trim().is_empty() && body.chars().count() >= MIN_PROBLEM_CHARS;
    if !clear_problem {
        missing.push(GAP_PROBLEM_STATEMENT.to_string());
    }

    let sufficient_context = issue.reproduction_steps.is_some()
        || !issue.linked.is_empty()
        || body.chars().count() >= MIN_CONTEXT_CHARS;
    if !sufficient_context {
        missing.push(GAP_CONTEXT.to_string());
    }

    let well_defined_scope = issue.proposed_solution.is_some()
        || issue.issue_type == IssueType::Documentation
        || body.to_lowercase().contains("scope")
        || body.to_lowercase().contains("acceptance criteria");
    if !well_defined_scope {
        missing.push(GAP_SCOPE.to_string());
    }

    if has_open_decision(issue) {
        missing.push(GAP_MAINTAINER_DECISION.to_string());
    }

    let ready = missing.is_empty();
    let mut notes = if ready {
        "Clear problem statement, sufficient context, and a well-defined scope with no blocking maintainer decisions.".to_string()
    } else {
        format!("Not ready for contribution; missing: {}.", missing.join(", "))
    };
    if decision.priority == Priority::High {
        notes.push_str(" Requires immediate maintainer attention ahead of community contribution.");
    }

    ReadinessVerdict {
        ready,
        notes,
        missing_information: missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn issue(title: &str, body: &str) -> Issue {
        let now = Utc::now();
        Issue {
            number: 11,
            title: title.to_string(),
            url: "https://example.com/issues/11".to_string(),
            body: body.to_string(),
            issue_type: IssueType::Bug,
            labels: vec![],
            linked: vec![],
            customer_impact: None,
            reproduction_steps: None,
            proposed_solution: None,
            is_pull_request: false,
            comment_count: 0,
            reaction_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn decision(priority: Priority) -> PriorityDecision {
        PriorityDecision {
            priority,
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_well_specified_issue_is_ready() {
        let mut subject = issue(
            "Client hangs indefinitely on 5xx",
            "The client hangs indefinitely on 5xx responses due to a race condition in the \
             retry counter. Root-cause analysis shows the counter is shared without locking \
             between the connection pool and the retry loop.",
        );
        subject.proposed_solution = Some("Guard the retry counter with a mutex.".to_string());

        let verdict = assess_readiness(&subject, &decision(Priority::MediumHigh));
        assert!(verdict.ready);
        assert!(verdict.missing_information.is_empty());
    }

    #[test]
    fn test_open_maintainer_decision_is_a_hard_gate() {
        // Long, well-written proposal with a solution attached, but the
        // architectural direction is still open.
        let mut subject = issue(
            "Restructure the transport layer",
            "This proposes a breaking architectural change to the transport layer. The full \
             migration plan is written out below with scope notes for every module, but the \
             direction is still awaiting decision from the maintainers.",
        );
        subject.proposed_solution = Some("Split transport into read and write halves.".to_string());

        let verdict = assess_readiness(&subject, &decision(Priority::MediumHigh));
        assert!(!verdict.ready);
        assert_eq!(
            verdict.missing_information,
            vec![GAP_MAINTAINER_DECISION.to_string()]
        );
    }

    #[test]
    fn test_thin_issue_enumerates_all_gaps() {
        let verdict = assess_readiness(&issue("Broken", "It fails."), &decision(Priority::Medium));
        assert!(!verdict.ready);
        assert_eq!(
            verdict.missing_information,
            vec![
                GAP_PROBLEM_STATEMENT.to_string(),
                GAP_CONTEXT.to_string(),
                GAP_SCOPE.to_string(),
            ]
        );
        assert!(verdict.notes.contains("missing"));
    }

    #[test]
    fn test_ready_iff_missing_information_empty() {
        let cases = [
            issue("Broken", "It fails."),
            issue(
                "Slow path",
                "The scope of this change is a single module; acceptance criteria are listed \
                 and the problem is described in enough detail for an outside contributor to \
                 pick it up without extra context from the team.",
            ),
        ];
        for subject in cases {
            let verdict = assess_readiness(&subject, &decision(Priority::Medium));
            assert_eq!(verdict.ready, verdict.missing_information.is_empty());
        }
    }

    #[test]
    fn test_repro_steps_and_links_count_as_context() {
        let mut subject = issue(
            "Client fails on empty payload",
            "Sending an empty payload makes the client return a confusing error message.",
        );
        subject.reproduction_steps = Some("Send an empty payload.".to_string());
        subject.proposed_solution = Some("Validate payloads before sending.".to_string());

        let verdict = assess_readiness(&subject, &decision(Priority::Medium));
        assert!(verdict.ready);
    }

    #[test]
    fn test_high_priority_noted() {
        let mut subject = issue(
            "Complete outage in the ingestion service",
            "Every request to the ingestion service fails outright. The failure is described \
             in detail here with logs from three environments and a full trace of the error.",
        );
        subject.proposed_solution = Some("Roll back the connection pool change.".to_string());

        let verdict = assess_readiness(&subject, &decision(Priority::High));
        assert!(verdict.notes.contains("immediate maintainer attention"));
    }
}

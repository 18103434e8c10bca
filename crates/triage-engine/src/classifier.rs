//! Priority classification
//!
//! A pure decision function over structured flags. The rules are the
//! core business policy of the whole pipeline:
//!
//! - High is reserved for on-call conditions: complete system failure,
//!   active data loss, or a critical security exploit. An issue with any
//!   stated workaround is never High, however many users it affects.
//! - Tool-category issues never rise above Medium.
//! - When factors point to adjacent levels, the lower one wins unless a
//!   security implication is present.

use triage_core::{Issue, IssueType, Priority};

const OUTAGE_MARKERS: [&str; 7] = [
    "complete outage",
    "full outage",
    "service outage",
    "complete system failure",
    "system is down",
    "total failure",
    "completely unusable",
];
const DATA_LOSS_MARKERS: [&str; 5] = [
    "data loss",
    "loses data",
    "losing data",
    "data corruption",
    "corrupts data",
];
const SECURITY_MARKERS: [&str; 4] = ["security", "vulnerability", "cve-", "exploit"];
const NO_WORKAROUND_MARKERS: [&str; 3] =
    ["no workaround", "without a workaround", "no known workaround"];
const COSTLY_MARKERS: [&str; 3] = ["complex", "costly", "cumbersome"];
const MULTI_USER_MARKERS: [&str; 6] = [
    "multiple users",
    "many users",
    "several users",
    "all users",
    "multiple customers",
    "many customers",
];
const BLOCKING_MARKERS: [&str; 6] = [
    "blocking",
    "blocks",
    "hangs",
    "cannot proceed",
    "deadlock",
    "unusable",
];
const DEMAND_MARKERS: [&str; 3] = [
    "highly requested",
    "frequently requested",
    "many users have asked",
];
const COSMETIC_MARKERS: [&str; 4] = ["typo", "cosmetic", "visual glitch", "whitespace"];
const MINOR_MARKERS: [&str; 4] = [
    "nice to have",
    "nice-to-have",
    "minor enhancement",
    "small improvement",
];
const CORE_DOCS_MARKERS: [&str; 4] = ["getting started", "quickstart", "installation", "api reference"];

/// Reaction count treated as clear demand for a feature
const DEMAND_REACTIONS: u32 = 5;

fn contains_any(haystack: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| haystack.contains(m))
}

/// Structured input to the priority decision
#[derive(Debug, Clone, Default)]
pub struct ClassifierInput {
    pub category: IssueType,
    /// Complete system failure or full service outage
    pub outage_class: bool,
    pub data_loss: bool,
    /// Exploit-class security condition requiring on-call response
    pub security_exploit: bool,
    /// Any security implication, exploit-class or not
    pub security_implication: bool,
    pub has_workaround: bool,
    /// The only stated workaround is complex or costly
    pub workaround_costly: bool,
    pub customer_impact: bool,
    pub multi_user: bool,
    pub blocking: bool,
    pub clear_feature_demand: bool,
    pub cosmetic: bool,
    pub minor_enhancement: bool,
    pub core_documentation: bool,
    pub is_pull_request: bool,
    /// Existing priority on a linked issue, consulted for pull requests
    pub linked_priority: Option<Priority>,
    /// A linked issue is already marked ready for contribution
    pub linked_ready: bool,
}

impl ClassifierInput {
    /// Derive the decision flags from an analyzed issue
    pub fn from_issue(issue: &Issue) -> Self {
        let haystack = format!("{}\n{}", issue.title, issue.body).to_lowercase();

        let has_workaround = haystack.contains("workaround")
            && !contains_any(&haystack, &NO_WORKAROUND_MARKERS);
        let security_implication = contains_any(&haystack, &SECURITY_MARKERS);
        let multi_user = contains_any(&haystack, &MULTI_USER_MARKERS);
        let clear_feature_demand = issue.issue_type == IssueType::Feature
            && (issue.reaction_count >= DEMAND_REACTIONS
                || contains_any(&haystack, &DEMAND_MARKERS));

        Self {
            category: issue.issue_type,
            outage_class: contains_any(&haystack, &OUTAGE_MARKERS),
            data_loss: contains_any(&haystack, &DATA_LOSS_MARKERS),
            security_exploit: haystack.contains("exploit"),
            security_implication,
            has_workaround,
            workaround_costly: has_workaround && contains_any(&haystack, &COSTLY_MARKERS),
            customer_impact: issue.customer_impact.is_some(),
            multi_user,
            blocking: contains_any(&haystack, &BLOCKING_MARKERS),
            clear_feature_demand,
            cosmetic: contains_any(&haystack, &COSMETIC_MARKERS),
            minor_enhancement: contains_any(&haystack, &MINOR_MARKERS),
            core_documentation: issue.issue_type == IssueType::Documentation
                && contains_any(&haystack, &CORE_DOCS_MARKERS),
            is_pull_request: issue.is_pull_request,
            linked_priority: None,
            linked_ready: false,
        }
    }
}

/// The classifier's output: one level plus its justification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityDecision {
    pub priority: Priority,
    pub reasoning: String,
}

fn bump_up(priority: Priority) -> Priority {
    match priority {
        Priority::Low => Priority::Medium,
        Priority::Medium => Priority::MediumHigh,
        other => other,
    }
}

fn on_call_condition(input: &ClassifierInput) -> Option<&'static str> {
    if input.security_exploit {
        Some("a critical security exploit")
    } else if input.data_loss {
        Some("active data loss")
    } else if input.outage_class {
        Some("a complete outage-class failure")
    } else {
        None
    }
}

/// Factor-based candidates below the High gate
fn level_candidates(input: &ClassifierInput) -> Vec<(Priority, String)> {
    let mut candidates = Vec::new();

    if on_call_condition(input).is_some() && input.has_workaround {
        candidates.push((
            Priority::MediumHigh,
            "an outage-class report mitigated by a stated workaround".to_string(),
        ));
    }
    if input.clear_feature_demand {
        candidates.push((
            Priority::MediumHigh,
            "clear customer demand for an important feature".to_string(),
        ));
    }
    if input.category == IssueType::Bug && input.multi_user {
        if input.workaround_costly {
            candidates.push((
                Priority::MediumHigh,
                "a significant bug affecting multiple users whose only workaround is costly"
                    .to_string(),
            ));
        } else if !input.has_workaround {
            candidates.push((
                Priority::MediumHigh,
                "a significant bug affecting multiple users with no workaround".to_string(),
            ));
        }
    }
    if input.category == IssueType::Bug && input.blocking && !input.has_workaround {
        candidates.push((
            Priority::MediumHigh,
            "a serious blocking defect with no stated workaround".to_string(),
        ));
    }

    if input.category == IssueType::Bug
        && input.has_workaround
        && !input.workaround_costly
        && !input.blocking
        && on_call_condition(input).is_none()
    {
        candidates.push((
            Priority::Medium,
            "a non-blocking bug with a workable mitigation".to_string(),
        ));
    }
    if input.category == IssueType::Tool {
        candidates.push((
            Priority::Medium,
            "a tool-category improvement".to_string(),
        ));
    }
    if input.core_documentation {
        candidates.push((
            Priority::Medium,
            "documentation for core functionality".to_string(),
        ));
    }

    if input.cosmetic {
        candidates.push((Priority::Low, "a cosmetic issue".to_string()));
    }
    if input.minor_enhancement {
        candidates.push((
            Priority::Low,
            "a minor nice-to-have enhancement".to_string(),
        ));
    }
    if input.category == IssueType::Documentation && !input.core_documentation {
        candidates.push((Priority::Low, "a documentation edit".to_string()));
    }

    candidates
}

fn default_reasoning(input: &ClassifierInput) -> String {
    let workaround = if input.has_workaround {
        "a workaround is available"
    } else {
        "no workaround is stated"
    };
    let impact = if input.customer_impact {
        "customer impact is stated"
    } else {
        "no customer impact is stated"
    };
    let nature = if input.blocking {
        "the issue reads as blocking"
    } else {
        "the issue is non-blocking"
    };
    format!("Standard request: {}, {}, and {}.", workaround, impact, nature)
}

/// Classify an issue into exactly one priority level
pub fn classify(input: &ClassifierInput) -> PriorityDecision {
    let mut notes: Vec<String> = Vec::new();

    // On-call gate. A stated workaround, however degraded, keeps an
    // issue out of High.
    let mut priority = if let (Some(condition), false) =
        (on_call_condition(input), input.has_workaround)
    {
        notes.push(format!(
            "Requires immediate on-call response: {} with no workaround available.",
            condition
        ));
        Priority::High
    } else {
        let candidates = level_candidates(input);
        if candidates.is_empty() {
            notes.push(default_reasoning(input));
            Priority::Medium
        } else {
            let top = candidates
                .iter()
                .map(|(p, _)| *p)
                .min()
                .unwrap_or(Priority::Medium);
            let adjacent = candidates
                .iter()
                .map(|(p, _)| *p)
                .find(|p| *p == top.step_down());

            let chosen = match adjacent {
                // Two factors point to adjacent levels: take the lower
                // unless a security implication is present.
                Some(lower) if !input.security_implication => lower,
                Some(_) => {
                    notes.push(
                        "A security implication weighs the decision toward the higher level."
                            .to_string(),
                    );
                    top
                }
                None => top,
            };

            for (p, reason) in &candidates {
                if *p == chosen || *p == top {
                    notes.push(format!("This is {}.", reason));
                }
            }
            chosen
        }
    };

    if input.is_pull_request {
        if let Some(linked) = input.linked_priority {
            // Adopt the linked issue's standing, but never into High on
            // linkage alone.
            let adopted = if linked == Priority::High {
                Priority::MediumHigh
            } else {
                linked
            };
            if adopted.is_above(priority) {
                priority = adopted;
                notes.push("A linked issue already carries a higher priority.".to_string());
            }
        }
        if input.linked_ready {
            let bumped = bump_up(priority);
            if bumped != priority {
                priority = bumped;
                notes.push(
                    "A linked issue is already marked ready for contribution.".to_string(),
                );
            }
        }
    }

    if input.category == IssueType::Tool && priority.is_above(Priority::Medium) {
        priority = Priority::Medium;
        notes.push("Tool-category issues are held at Medium.".to_string());
    }

    PriorityDecision {
        priority,
        reasoning: notes.join(" "),
    }
}

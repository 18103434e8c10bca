//! Issue analysis
//!
//! Turns a raw platform snapshot into the canonical issue record plus a
//! narrative context summary. Pure over the snapshot: deterministic for
//! identical input, no network access. A field present in the snapshot
//! is never omitted from the summary.

use triage_core::{Issue, IssueSnapshot, IssueType};

/// Character cap applied to extracted narrative fields
const MAX_FIELD_CHARS: usize = 280;

const CUSTOMER_IMPACT_MARKERS: [&str; 3] =
    ["customer impact", "impact on customers", "affected customers"];
const REPRO_MARKERS: [&str; 4] = [
    "reproduction steps",
    "steps to reproduce",
    "repro steps",
    "how to reproduce",
];
const SOLUTION_MARKERS: [&str; 6] = [
    "proposed solution",
    "proposed fix",
    "proposed patch",
    "suggested fix",
    "suggested solution",
    "possible fix",
];

/// An analyzed issue: the canonical record and its context summary
#[derive(Debug, Clone)]
pub struct AnalyzedIssue {
    pub issue: Issue,
    /// Narrative summary lines, one per extracted aspect
    pub summary: Vec<String>,
}

fn truncate_field(text: &str) -> String {
    if text.chars().count() <= MAX_FIELD_CHARS {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(MAX_FIELD_CHARS).collect();
        out.push('…');
        out
    }
}

fn strip_decoration(line: &str) -> &str {
    line.trim_start_matches(['#', '*', '-', '>', ' '])
}

/// Extract the text following a section marker, if the body carries one
///
/// Matches both inline form (`Customer impact: two users affected`) and
/// header form (a marker line followed by the section's paragraph).
fn extract_section(body: &str, markers: &[&str]) -> Option<String> {
    let lines: Vec<&str> = body.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        let stripped = strip_decoration(line);
        for marker in markers {
            let Some(prefix) = stripped.get(..marker.len()) else {
                continue;
            };
            if !prefix.eq_ignore_ascii_case(marker) {
                continue;
            }

            let after = stripped[marker.len()..].trim_start_matches([':', ' ', '-', '*']);
            if !after.trim().is_empty() {
                return Some(truncate_field(after.trim()));
            }

            // Header form: collect the following paragraph
            let mut section = Vec::new();
            for next in &lines[i + 1..] {
                let text = next.trim();
                if text.starts_with('#') || (text.is_empty() && !section.is_empty()) {
                    break;
                }
                if !text.is_empty() {
                    section.push(strip_decoration(text).to_string());
                }
            }
            if !section.is_empty() {
                return Some(truncate_field(&section.join(" ")));
            }
        }
    }

    None
}

fn derive_issue_type(title: &str, labels: &[String]) -> IssueType {
    for label in labels {
        if let Ok(issue_type) = label.parse::<IssueType>() {
            if issue_type != IssueType::Other {
                return issue_type;
            }
        }
    }

    let title = title.to_lowercase();
    if title.starts_with("[bug]") || title.starts_with("bug:") {
        IssueType::Bug
    } else if title.starts_with("[docs]") || title.starts_with("docs:") {
        IssueType::Documentation
    } else if title.starts_with("[feature]") || title.starts_with("feature:") {
        IssueType::Feature
    } else {
        IssueType::Other
    }
}

/// Analyze a raw snapshot into the canonical issue and context summary
pub fn analyze(snapshot: &IssueSnapshot) -> AnalyzedIssue {
    let issue_type = derive_issue_type(&snapshot.title, &snapshot.labels);
    let customer_impact = extract_section(&snapshot.body, &CUSTOMER_IMPACT_MARKERS);
    let reproduction_steps = extract_section(&snapshot.body, &REPRO_MARKERS);
    let proposed_solution = extract_section(&snapshot.body, &SOLUTION_MARKERS);

    let mut summary = vec![format!(
        "Issue #{} is a {} report titled \"{}\".",
        snapshot.number, issue_type, snapshot.title
    )];
    if !snapshot.labels.is_empty() {
        summary.push(format!("Labels applied: {}.", snapshot.labels.join(", ")));
    }
    if !snapshot.linked.is_empty() {
        let refs: Vec<String> = snapshot.linked.iter().map(|n| format!("#{}", n)).collect();
        summary.push(format!("Linked references: {}.", refs.join(", ")));
    }
    if let Some(impact) = &customer_impact {
        summary.push(format!("Customer impact is stated: {}", impact));
    }
    if let Some(repro) = &reproduction_steps {
        summary.push(format!("Reproduction steps are provided: {}", repro));
    }
    if let Some(solution) = &proposed_solution {
        summary.push(format!("A solution is proposed: {}", solution));
    }

    let issue = Issue {
        number: snapshot.number,
        title: snapshot.title.clone(),
        url: snapshot.url.clone(),
        body: snapshot.body.clone(),
        issue_type,
        labels: snapshot.labels.clone(),
        linked: snapshot.linked.clone(),
        customer_impact,
        reproduction_steps,
        proposed_solution,
        is_pull_request: snapshot.is_pull_request,
        comment_count: snapshot.comment_count,
        reaction_count: snapshot.reaction_count,
        created_at: snapshot.created_at,
        updated_at: snapshot.updated_at,
    };

    AnalyzedIssue { issue, summary }
}

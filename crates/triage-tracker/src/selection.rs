//! Candidate selection for a review session
//!
//! Pure, deterministic pass over the searched pool: already-triaged
//! issues (any priority label) are excluded, duplicates collapse by
//! number, and the survivors are ordered bug-type first, then focus-area
//! matches, then by engagement score. The result is never padded: fewer
//! distinct candidates than requested is reported as a shortfall, not
//! filled with synthetic records.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use triage_core::CandidateRecord;

/// Multiplier applied to the requested count when searching the backlog,
/// so scoring works over a real pool
pub const OVERFETCH_FACTOR: usize = 3;

/// Page-size ceiling for a single backlog search
pub const MAX_SEARCH_LIMIT: usize = 100;

const HIGH_REACTIONS: u32 = 5;
const MEDIUM_REACTIONS: u32 = 2;
const HIGH_COMMENTS: u32 = 10;
const STALE_AGE_DAYS: i64 = 30;

/// How many candidates to request from the platform for a session
pub fn overfetch_limit(requested: usize) -> usize {
    let requested = requested.min(MAX_SEARCH_LIMIT);
    (requested * OVERFETCH_FACTOR).clamp(requested, MAX_SEARCH_LIMIT)
}

/// A candidate chosen for review, with its selection rationale
#[derive(Debug, Clone)]
pub struct SelectedCandidate {
    pub record: CandidateRecord,
    pub score: i64,
    /// One-sentence narrative explaining the selection factors
    pub reason_selected: String,
}

/// Result of a selection pass
#[derive(Debug, Clone)]
pub struct Selection {
    /// Chosen candidates in review order
    pub picked: Vec<SelectedCandidate>,
    /// Present whenever fewer candidates than requested were available
    pub shortfall: Option<String>,
}

fn engagement_score(record: &CandidateRecord, now: DateTime<Utc>) -> i64 {
    let mut score = 0i64;

    if record.reaction_count >= HIGH_REACTIONS {
        score += 5;
    } else if record.reaction_count >= MEDIUM_REACTIONS {
        score += 3;
    }

    if record.comment_count >= HIGH_COMMENTS {
        score += 3;
    }

    if record.has_label("bug") {
        score += 2;
    }

    if (now - record.created_at).num_days() > STALE_AGE_DAYS {
        score += 2;
    }

    if record.has_label("feature") || record.has_label("enhancement") {
        score += 1;
    }

    score
}

fn matches_focus(record: &CandidateRecord, focus_area: Option<&str>) -> bool {
    let Some(focus) = focus_area else {
        return false;
    };
    let focus = focus.to_lowercase();
    record.labels.iter().any(|l| l.to_lowercase().contains(&focus))
        || record.title.to_lowercase().contains(&focus)
}

fn selection_reason(
    record: &CandidateRecord,
    focus_match: bool,
    now: DateTime<Utc>,
) -> String {
    let mut factors = Vec::new();

    if record.has_label("bug") {
        factors.push("carries the bug label".to_string());
    } else if record.has_label("feature") || record.has_label("enhancement") {
        factors.push("is a feature request".to_string());
    }

    if record.reaction_count >= MEDIUM_REACTIONS {
        factors.push(format!("has {} reactions", record.reaction_count));
    }
    if record.comment_count >= HIGH_COMMENTS {
        factors.push(format!("has {} comments", record.comment_count));
    }

    let age_days = (now - record.created_at).num_days();
    if age_days > STALE_AGE_DAYS {
        factors.push(format!("has waited {} days in the backlog", age_days));
    }

    if focus_match {
        factors.push("matches the session focus area".to_string());
    }

    if factors.is_empty() {
        "Selected because it has no priority label and awaits triage.".to_string()
    } else {
        format!(
            "Selected because it has no priority label and {}.",
            factors.join(", ")
        )
    }
}

/// Select up to `requested` candidates from a searched pool
///
/// Excludes pull requests, subtasks, and anything already carrying a
/// priority label; collapses duplicates; orders bug-type issues first,
/// then focus-area matches, then by engagement score.
pub fn select(
    pool: Vec<CandidateRecord>,
    requested: usize,
    focus_area: Option<&str>,
) -> Selection {
    let now = Utc::now();
    let mut seen: HashSet<u64> = HashSet::new();
    let mut eligible: Vec<CandidateRecord> = Vec::new();

    for record in pool {
        if record.is_pull_request || record.has_parent || record.has_priority_label() {
            continue;
        }
        if !seen.insert(record.number) {
            continue;
        }
        eligible.push(record);
    }

    eligible.sort_by_key(|record| {
        (
            if record.has_label("bug") { 0u8 } else { 1u8 },
            if matches_focus(record, focus_area) { 0u8 } else { 1u8 },
            -engagement_score(record, now),
            record.number,
        )
    });

    let picked: Vec<SelectedCandidate> = eligible
        .into_iter()
        .take(requested)
        .map(|record| {
            let focus_match = matches_focus(&record, focus_area);
            let score = engagement_score(&record, now);
            let reason_selected = selection_reason(&record, focus_match, now);
            SelectedCandidate {
                record,
                score,
                reason_selected,
            }
        })
        .collect();

    let shortfall = if picked.len() < requested {
        Some(format!(
            "backlog supplied only {} distinct, non-duplicate candidates without a priority label ({} requested)",
            picked.len(),
            requested
        ))
    } else {
        None
    };

    Selection { picked, shortfall }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(number: u64, labels: &[&str]) -> CandidateRecord {
        CandidateRecord {
            number,
            title: format!("Issue {}", number),
            url: format!("https://example.com/issues/{}", number),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            created_at: Utc::now() - Duration::days(5),
            comment_count: 0,
            reaction_count: 0,
            is_pull_request: false,
            has_parent: false,
        }
    }

    #[test]
    fn test_excludes_prioritized_issues() {
        let mut triaged = record(1, &["bug", "High"]);
        triaged.reaction_count = 20;
        let pool = vec![triaged, record(2, &["bug"]), record(3, &["priority: medium"])];

        let selection = select(pool, 10, None);
        let numbers: Vec<u64> = selection.picked.iter().map(|c| c.record.number).collect();
        assert_eq!(numbers, vec![2]);
    }

    #[test]
    fn test_excludes_pull_requests_and_subtasks() {
        let mut pr = record(1, &[]);
        pr.is_pull_request = true;
        let mut subtask = record(2, &[]);
        subtask.has_parent = true;
        let pool = vec![pr, subtask, record(3, &[])];

        let selection = select(pool, 10, None);
        assert_eq!(selection.picked.len(), 1);
        assert_eq!(selection.picked[0].record.number, 3);
    }

    #[test]
    fn test_deduplicates_by_number() {
        let pool = vec![record(7, &["bug"]), record(7, &["bug"]), record(8, &[])];
        let selection = select(pool, 10, None);
        assert_eq!(selection.picked.len(), 2);
    }

    #[test]
    fn test_never_pads_and_reports_shortfall() {
        // Twelve requested, thirteen records but two are duplicates of
        // the same issue: eleven distinct candidates.
        let mut pool: Vec<CandidateRecord> = (1..=11).map(|n| record(n, &[])).collect();
        pool.push(record(4, &[]));
        pool.push(record(9, &[]));

        let selection = select(pool, 12, None);
        assert_eq!(selection.picked.len(), 11);
        let reason = selection.shortfall.unwrap();
        assert!(reason.contains("11 distinct, non-duplicate"));
        assert!(reason.contains("12 requested"));
    }

    #[test]
    fn test_no_shortfall_when_enough() {
        let pool: Vec<CandidateRecord> = (1..=5).map(|n| record(n, &[])).collect();
        let selection = select(pool, 5, None);
        assert_eq!(selection.picked.len(), 5);
        assert!(selection.shortfall.is_none());
    }

    #[test]
    fn test_bugs_order_first() {
        let mut feature = record(1, &["feature"]);
        feature.reaction_count = 10;
        let bug = record(2, &["bug"]);

        let selection = select(vec![feature, bug], 2, None);
        assert_eq!(selection.picked[0].record.number, 2);
    }

    #[test]
    fn test_focus_matches_order_before_rest() {
        let other = record(1, &["feature"]);
        let focused = record(2, &["tools"]);

        let selection = select(vec![other, focused], 2, Some("tools"));
        assert_eq!(selection.picked[0].record.number, 2);
    }

    #[test]
    fn test_engagement_breaks_ties() {
        let quiet = record(1, &["bug"]);
        let mut popular = record(2, &["bug"]);
        popular.reaction_count = 8;
        popular.comment_count = 14;

        let selection = select(vec![quiet, popular], 2, None);
        assert_eq!(selection.picked[0].record.number, 2);
        assert!(selection.picked[0].score > selection.picked[1].score);
    }

    #[test]
    fn test_reason_names_factors_without_bullets() {
        let mut popular = record(2, &["bug"]);
        popular.reaction_count = 8;
        popular.comment_count = 14;

        let selection = select(vec![popular], 1, None);
        let reason = &selection.picked[0].reason_selected;
        assert!(reason.contains("bug label"));
        assert!(reason.contains("8 reactions"));
        assert!(reason.contains("14 comments"));
        assert!(!reason.contains('-'));
        assert!(!reason.contains('*'));
    }

    #[test]
    fn test_overfetch_limit() {
        assert_eq!(overfetch_limit(12), 36);
        assert_eq!(overfetch_limit(50), 100);
        assert_eq!(overfetch_limit(0), 0);
        assert_eq!(overfetch_limit(500), 100);
    }
}

//! Cross-issue pattern detection for the session summary

use std::collections::BTreeMap;
use triage_core::{is_priority_label, Priority, ReviewedIssue};

/// A label theme shared across several issues in one session
const RECURRING_THEME_MIN: usize = 3;

/// A gap reported for more than one issue
const COMMON_GAP_MIN: usize = 2;

/// A recurring theme and how many issues carry it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeCount {
    pub theme: String,
    pub count: usize,
}

/// Session-level findings rendered into the summary
#[derive(Debug, Clone, Default)]
pub struct SessionFindings {
    /// Labels appearing on several issues in the same session
    pub recurring_themes: Vec<ThemeCount>,
    /// Issue numbers classified High, flagged for immediate attention
    pub immediate_attention: Vec<u64>,
    /// Missing-information items reported for more than one issue
    pub common_gaps: Vec<ThemeCount>,
}

impl SessionFindings {
    pub fn is_empty(&self) -> bool {
        self.recurring_themes.is_empty()
            && self.immediate_attention.is_empty()
            && self.common_gaps.is_empty()
    }
}

/// Detect cross-issue patterns in a session's reviewed issues
pub fn detect_patterns(reviewed: &[ReviewedIssue]) -> SessionFindings {
    let mut label_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut gap_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut immediate_attention = Vec::new();

    for item in reviewed {
        for label in &item.issue.labels {
            if is_priority_label(label) {
                continue;
            }
            *label_counts.entry(label.to_lowercase()).or_default() += 1;
        }

        for gap in &item.assessment.missing_information {
            *gap_counts.entry(gap.to_lowercase()).or_default() += 1;
        }

        if item.assessment.priority == Priority::High {
            immediate_attention.push(item.issue.number);
        }
    }

    let recurring_themes = label_counts
        .into_iter()
        .filter(|(_, count)| *count >= RECURRING_THEME_MIN)
        .map(|(theme, count)| ThemeCount { theme, count })
        .collect();

    let common_gaps = gap_counts
        .into_iter()
        .filter(|(_, count)| *count >= COMMON_GAP_MIN)
        .map(|(theme, count)| ThemeCount { theme, count })
        .collect();

    SessionFindings {
        recurring_themes,
        immediate_attention,
        common_gaps,
    }
}

//! Markdown rendering of a review session

use crate::patterns::SessionFindings;
use triage_core::{ReviewSession, SessionStatus};

/// Render a finished session into its Markdown document
pub fn render_markdown(session: &ReviewSession, findings: &SessionFindings) -> String {
    let mut md = format!(
        "# Issue Triage Review - {}\n\n## Session Summary\n",
        session.params.meeting_date
    );

    md.push_str(&format!(
        "- **Total Issues Reviewed:** {}\n",
        session.analyzed_count()
    ));
    md.push_str(&format!(
        "- **Ready for Contribution:** {}\n",
        session.ready_count()
    ));
    md.push_str(&format!(
        "- **Max Issues Requested:** {}\n",
        session.requested_count
    ));
    md.push_str(&format!(
        "- **Focus Area:** {}\n",
        session.params.focus_area.as_deref().unwrap_or("All areas")
    ));
    md.push_str(&format!("- **Backlog:** {}\n", session.params.backlog));

    md.push_str("\n### Priority Buckets\n");
    for (priority, count) in session.counts_by_priority() {
        md.push_str(&format!("- **{}:** {}\n", priority, count));
    }
    md.push('\n');

    if session.status == SessionStatus::PartialCompletion {
        md.push_str("## Session Status: PARTIAL COMPLETION\n\n");
        if let Some(reason) = &session.shortfall_reason {
            md.push_str(&format!("**Shortfall:** {}\n\n", reason));
        }
        for failure in &session.analysis_failures {
            md.push_str(&format!(
                "**Analysis failed for #{}:** {}\n\n",
                failure.number, failure.reason
            ));
        }
    }

    if !findings.is_empty() {
        md.push_str("## Patterns\n\n");
        for theme in &findings.recurring_themes {
            md.push_str(&format!(
                "- Recurring theme **{}** across {} issues\n",
                theme.theme, theme.count
            ));
        }
        for gap in &findings.common_gaps {
            md.push_str(&format!(
                "- **{}** missing from {} issues\n",
                gap.theme, gap.count
            ));
        }
        if !findings.immediate_attention.is_empty() {
            let numbers: Vec<String> = findings
                .immediate_attention
                .iter()
                .map(|n| format!("#{}", n))
                .collect();
            md.push_str(&format!(
                "- Flagged for immediate attention: {}\n",
                numbers.join(", ")
            ));
        }
        md.push('\n');
    }

    if session.reviewed.is_empty() {
        md.push_str(
            "## No Issues Analyzed\n\nNo issues were successfully analyzed during this session.\n\n",
        );
    } else {
        md.push_str("## Issues Analyzed\n\n");
        for item in &session.reviewed {
            let issue = &item.issue;
            let assessment = &item.assessment;

            md.push_str(&format!("### Issue #{}: {}\n", issue.number, issue.title));
            md.push_str(&format!("**URL:** {}\n", issue.url));
            md.push_str(&format!("**Type:** {}\n", issue.issue_type));
            md.push_str(&format!(
                "**Recommended Priority:** {}\n\n",
                assessment.priority
            ));

            md.push_str("**Summary:**\n");
            if assessment.summary.is_empty() {
                md.push_str("No summary available.\n");
            } else {
                md.push_str(&assessment.summary.join(" "));
                md.push('\n');
            }

            md.push_str(&format!(
                "\n**Priority Reasoning:**\n{}\n",
                assessment.priority_reasoning
            ));

            md.push_str(&format!(
                "\n**Ready for Contribution:**\n{} - {}\n",
                if assessment.ready_for_contribution {
                    "Yes"
                } else {
                    "No"
                },
                assessment.readiness_notes
            ));

            match &issue.customer_impact {
                Some(impact) => {
                    md.push_str(&format!("\n**Customer Impact:**\nYes - {}\n", impact))
                }
                None => md.push_str("\n**Customer Impact:**\nNo\n"),
            }

            if !assessment.missing_information.is_empty() {
                md.push_str(&format!(
                    "\n**Missing Information:**\n{}\n",
                    assessment.missing_information.join(" ")
                ));
            }

            md.push_str("\n---\n\n");
        }
    }

    if !session.write_back_failures.is_empty() {
        md.push_str("## Write-back Failures\n\n");
        for failure in &session.write_back_failures {
            md.push_str(&format!("- #{}: {}\n", failure.number, failure.reason));
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use triage_core::{
        Assessment, Issue, IssueType, Priority, ReviewedIssue, SessionParams, WriteBackFailure,
    };

    fn session_with_one_issue() -> ReviewSession {
        let now = Utc::now();
        let params = SessionParams::new(
            NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            2,
            "acme/widgets",
        );
        let mut session = ReviewSession::new(params);
        session.reviewed.push(ReviewedIssue {
            issue: Issue {
                number: 42,
                title: "Client hangs on retry".to_string(),
                url: "https://example.com/issues/42".to_string(),
                body: String::new(),
                issue_type: IssueType::Bug,
                labels: vec!["bug".to_string()],
                linked: vec![],
                customer_impact: Some("Two customers report stuck pipelines.".to_string()),
                reproduction_steps: None,
                proposed_solution: None,
                is_pull_request: false,
                comment_count: 3,
                reaction_count: 6,
                created_at: now,
                updated_at: now,
            },
            assessment: Assessment {
                summary: vec!["The client hangs when retries race.".to_string()],
                priority: Priority::MediumHigh,
                priority_reasoning: "Serious reliability defect without a workaround.".to_string(),
                ready_for_contribution: true,
                readiness_notes: "Clear problem statement and scope.".to_string(),
                missing_information: vec![],
            },
        });
        session
    }

    #[test]
    fn test_renders_per_issue_sections() {
        let mut session = session_with_one_issue();
        session.status = SessionStatus::Completed;

        let md = render_markdown(&session, &SessionFindings::default());
        assert!(md.contains("# Issue Triage Review - 2026-08-06"));
        assert!(md.contains("### Issue #42: Client hangs on retry"));
        assert!(md.contains("**Recommended Priority:** Medium-High"));
        assert!(md.contains("**Customer Impact:**\nYes - Two customers"));
        assert!(md.contains("Ready for Contribution:**\nYes"));
    }

    #[test]
    fn test_partial_completion_banner() {
        let mut session = session_with_one_issue();
        session.status = SessionStatus::PartialCompletion;
        session.shortfall_reason = Some("only 1 distinct candidate available".to_string());

        let md = render_markdown(&session, &SessionFindings::default());
        assert!(md.contains("PARTIAL COMPLETION"));
        assert!(md.contains("only 1 distinct candidate available"));
    }

    #[test]
    fn test_empty_session_section() {
        let params = SessionParams::new(
            NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            3,
            "acme/widgets",
        );
        let session = ReviewSession::new(params);

        let md = render_markdown(&session, &SessionFindings::default());
        assert!(md.contains("## No Issues Analyzed"));
    }

    #[test]
    fn test_write_back_failures_listed() {
        let mut session = session_with_one_issue();
        session.status = SessionStatus::PartialCompletion;
        session.write_back_failures.push(WriteBackFailure {
            number: 42,
            reason: "label update rejected".to_string(),
        });

        let md = render_markdown(&session, &SessionFindings::default());
        assert!(md.contains("## Write-back Failures"));
        assert!(md.contains("#42: label update rejected"));
    }

    #[test]
    fn test_patterns_section() {
        let mut session = session_with_one_issue();
        session.status = SessionStatus::Completed;
        let findings = SessionFindings {
            recurring_themes: vec![crate::patterns::ThemeCount {
                theme: "streaming".to_string(),
                count: 3,
            }],
            immediate_attention: vec![42],
            common_gaps: vec![],
        };

        let md = render_markdown(&session, &findings);
        assert!(md.contains("Recurring theme **streaming** across 3 issues"));
        assert!(md.contains("Flagged for immediate attention: #42"));
    }
}

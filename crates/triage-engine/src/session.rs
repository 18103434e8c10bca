//! Session orchestration driver
//!
//! Owns the in-memory `ReviewSession` and drives it through the pure
//! state machine: validate, fetch, fan out per-issue analysis, persist
//! the document exactly once, then write back per issue. Fatal errors
//! (invalid parameters, source unavailable) abort before any document is
//! written; per-issue failures are recorded and never abort the session.

use crate::analyzer::analyze;
use crate::classifier::{classify, ClassifierInput};
use crate::readiness::assess_readiness;
use crate::state::{transition, SessionAction, SessionEvent, SessionState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use triage_core::{
    AnalysisFailure, Assessment, Result, ReviewSession, ReviewedIssue, SessionParams,
    SessionStatus, TriageError, WriteBackFailure,
};
use triage_report::{detect_patterns, render_markdown, DocumentStore};
use triage_tracker::selection::{overfetch_limit, select, SelectedCandidate};
use triage_tracker::IssueTracker;

/// Result of a finished session run
#[derive(Debug)]
pub struct SessionOutcome {
    pub session: ReviewSession,
    pub document_path: PathBuf,
}

/// Drives one review session from parameters to a terminal state
pub struct SessionRunner<T, S> {
    tracker: Arc<T>,
    store: S,
    concurrency: usize,
    dry_run: bool,
    post_summary_comment: bool,
}

impl<T, S> SessionRunner<T, S>
where
    T: IssueTracker + 'static,
    S: DocumentStore,
{
    pub fn new(tracker: Arc<T>, store: S) -> Self {
        Self {
            tracker,
            store,
            concurrency: 4,
            dry_run: false,
            post_summary_comment: false,
        }
    }

    /// Cap on concurrently analyzed issues
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Skip the write-back stage entirely
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Post a summary comment on each issue during write-back
    pub fn with_summary_comments(mut self, enabled: bool) -> Self {
        self.post_summary_comment = enabled;
        self
    }

    /// Run a session to one of its terminal states
    ///
    /// Returns `Err` only for fatal conditions, in which case no
    /// document has been written. Partial completion is an `Ok` outcome
    /// with the shortfall and failure lists attached to the session.
    pub async fn run(&self, params: SessionParams) -> Result<SessionOutcome> {
        let mut state = SessionState::Initializing;

        if let Err(reason) = validate_params(&params) {
            let (next, actions) = transition(
                state,
                SessionEvent::ParametersInvalid {
                    reason: reason.clone(),
                },
            );
            log_actions(&actions);
            debug_assert!(matches!(next, SessionState::Failed { .. }));
            return Err(TriageError::InvalidParameters(reason));
        }

        let requested = params.max_issues;
        let mut session = ReviewSession::new(params.clone());

        let (next, actions) = transition(state, SessionEvent::ParametersValid { requested });
        log_actions(&actions);
        state = next;

        // Fetching. Retrieval exhausting its retry budget is fatal: the
        // session terminates with nothing written, and no synthetic
        // issues are ever substituted for the missing data.
        let limit = overfetch_limit(requested);
        let pool = match self.tracker.search_candidates(&params.backlog, limit).await {
            Ok(pool) => pool,
            Err(e) => {
                let (next, actions) = transition(
                    state,
                    SessionEvent::FetchFailed {
                        reason: e.to_string(),
                    },
                );
                log_actions(&actions);
                debug_assert!(matches!(next, SessionState::Failed { .. }));
                return Err(e);
            }
        };

        let selection = select(pool, requested, params.focus_area.as_deref());
        session.shortfall_reason = selection.shortfall.clone();

        let (next, actions) = transition(
            state,
            SessionEvent::FetchSucceeded {
                candidates: selection.picked.len(),
                shortfall: selection.shortfall.clone(),
            },
        );
        log_actions(&actions);
        state = next;

        // Analyzing and assessing, fanned out per issue and collected in
        // retrieval order.
        let (reviewed, failures) = self.analyze_all(&params.backlog, selection.picked).await;
        session.reviewed = reviewed;
        session.analysis_failures = failures;

        let (next, actions) = transition(
            state,
            SessionEvent::AnalysisComplete {
                analyzed: session.analyzed_count(),
                failures: session.analysis_failures.len(),
            },
        );
        log_actions(&actions);
        state = next;

        // Documenting, exactly once. The document carries the status as
        // of analysis; later write-back failures are recorded on the
        // session without re-persisting.
        session.status = if session.analyzed_count() == session.requested_count
            && session.analysis_failures.is_empty()
        {
            SessionStatus::Completed
        } else {
            SessionStatus::PartialCompletion
        };
        let findings = detect_patterns(&session.reviewed);
        let body = render_markdown(&session, &findings);
        let document_path = self
            .store
            .persist(params.meeting_date, &body)
            .await?;

        let (next, actions) = transition(state, SessionEvent::DocumentPersisted);
        log_actions(&actions);
        state = next;

        // Writing back, tolerating individual failures.
        if self.dry_run {
            info!("Dry run: skipping write-back for {} issues", session.analyzed_count());
        } else {
            session.write_back_failures =
                self.write_back(&params.backlog, &session.reviewed).await;
        }

        let (next, actions) = transition(
            state,
            SessionEvent::WriteBackComplete {
                failures: session.write_back_failures.len(),
            },
        );
        log_actions(&actions);

        session.status = match next {
            SessionState::Completed { .. } => SessionStatus::Completed,
            _ => SessionStatus::PartialCompletion,
        };

        Ok(SessionOutcome {
            session,
            document_path,
        })
    }

    /// Fetch, analyze, classify, and assess every candidate
    ///
    /// Tasks run concurrently up to the configured width; results are
    /// collected by original index so document order always matches
    /// retrieval order, never completion order.
    async fn analyze_all(
        &self,
        backlog: &str,
        picked: Vec<SelectedCandidate>,
    ) -> (Vec<ReviewedIssue>, Vec<AnalysisFailure>) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles: Vec<(u64, JoinHandle<Result<ReviewedIssue>>)> = Vec::new();

        for candidate in picked {
            let tracker = Arc::clone(&self.tracker);
            let semaphore = Arc::clone(&semaphore);
            let backlog = backlog.to_string();
            let number = candidate.record.number;

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| TriageError::Analysis(e.to_string()))?;
                assess_candidate(tracker.as_ref(), &backlog, candidate).await
            });
            handles.push((number, handle));
        }

        let mut reviewed = Vec::new();
        let mut failures = Vec::new();

        for (number, handle) in handles {
            match handle.await {
                Ok(Ok(item)) => reviewed.push(item),
                Ok(Err(e)) => {
                    warn!("Excluding issue #{} from session: {}", number, e);
                    failures.push(AnalysisFailure {
                        number,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Analysis task for issue #{} did not finish: {}", number, e);
                    failures.push(AnalysisFailure {
                        number,
                        reason: format!("analysis task did not finish: {}", e),
                    });
                }
            }
        }

        (reviewed, failures)
    }

    async fn write_back(
        &self,
        backlog: &str,
        reviewed: &[ReviewedIssue],
    ) -> Vec<WriteBackFailure> {
        let mut failures = Vec::new();

        for item in reviewed {
            if let Err(e) = self.write_back_issue(backlog, item).await {
                warn!(
                    "Write-back failed for issue #{}: {}",
                    item.issue.number, e
                );
                failures.push(WriteBackFailure {
                    number: item.issue.number,
                    reason: e.to_string(),
                });
            }
        }

        failures
    }

    async fn write_back_issue(&self, backlog: &str, item: &ReviewedIssue) -> Result<()> {
        let number = item.issue.number;

        self.tracker
            .set_priority_label(backlog, number, item.assessment.priority)
            .await?;

        if item.assessment.ready_for_contribution {
            self.tracker.add_ready_label(backlog, number).await?;
        }

        if self.post_summary_comment {
            let comment = format!(
                "Triage review: recommended priority {}. {}",
                item.assessment.priority, item.assessment.priority_reasoning
            );
            self.tracker.post_comment(backlog, number, &comment).await?;
        }

        Ok(())
    }
}

fn validate_params(params: &SessionParams) -> std::result::Result<(), String> {
    if params.max_issues == 0 {
        return Err("max_issues must be a positive integer".to_string());
    }
    if params.backlog.trim().is_empty() {
        return Err("backlog reference must not be empty".to_string());
    }
    if let Some(focus) = &params.focus_area {
        if focus.trim().is_empty() {
            return Err("focus_area must not be empty when supplied".to_string());
        }
    }
    Ok(())
}

/// Per-issue pipeline: fetch, then pure analysis and assessment
async fn assess_candidate<T: IssueTracker + ?Sized>(
    tracker: &T,
    backlog: &str,
    candidate: SelectedCandidate,
) -> Result<ReviewedIssue> {
    let snapshot = tracker
        .fetch_issue(backlog, candidate.record.number)
        .await
        .map_err(|e| TriageError::Analysis(e.to_string()))?;

    let analyzed = analyze(&snapshot);
    let decision = classify(&ClassifierInput::from_issue(&analyzed.issue));
    let verdict = assess_readiness(&analyzed.issue, &decision);

    let mut summary = analyzed.summary;
    summary.push(candidate.reason_selected);

    Ok(ReviewedIssue {
        issue: analyzed.issue,
        assessment: Assessment {
            summary,
            priority: decision.priority,
            priority_reasoning: decision.reasoning,
            ready_for_contribution: verdict.ready,
            readiness_notes: verdict.notes,
            missing_information: verdict.missing_information,
        },
    })
}

fn log_actions(actions: &[SessionAction]) {
    for action in actions {
        if let SessionAction::Log(message) = action {
            info!("{}", message);
        }
    }
}

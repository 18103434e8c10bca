//! Pure state machine for the session lifecycle
//!
//! No I/O, no async, no dependencies on the rest of the engine. The
//! driver feeds events and executes the returned actions; all ordering
//! rules live here:
//!
//! - `Failed` is reachable only from `Initializing` (invalid parameters)
//!   and `Fetching` (source unavailable). Once analysis begins the
//!   session always reaches a reportable terminal state.
//! - The document is persisted exactly once, between analysis and
//!   write-back.
//! - A session that analyzed fewer issues than requested terminates as
//!   `PartialCompletion` with at least one recorded reason, never as
//!   `Completed`.
//!
//! Invalid transitions go to `Failed`; this function never panics.

/// Session lifecycle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Validating parameters; no session record exists yet
    Initializing,
    /// Querying the backlog for candidates
    Fetching { requested: usize },
    /// Per-issue analysis, classification, and readiness assessment
    Analyzing {
        requested: usize,
        candidates: usize,
        shortfall: Option<String>,
    },
    /// Persisting the session document
    Documenting {
        requested: usize,
        analyzed: usize,
        issue_failures: usize,
        shortfall: Option<String>,
    },
    /// Applying per-issue write-backs
    WritingBack {
        requested: usize,
        analyzed: usize,
        issue_failures: usize,
        shortfall: Option<String>,
    },
    /// Every requested issue analyzed, every write-back applied
    Completed { analyzed: usize },
    /// Valid terminal state with recorded reasons
    PartialCompletion {
        analyzed: usize,
        reasons: Vec<String>,
    },
    /// Fatal termination; no document was written
    Failed { error: String },
}

/// Events that drive state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ParametersValid { requested: usize },
    ParametersInvalid { reason: String },
    FetchSucceeded {
        candidates: usize,
        shortfall: Option<String>,
    },
    FetchFailed { reason: String },
    AnalysisComplete { analyzed: usize, failures: usize },
    DocumentPersisted,
    WriteBackComplete { failures: usize },
}

/// Actions to execute as side effects of transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    Log(String),
    FetchCandidates { requested: usize },
    AnalyzeIssues { count: usize },
    PersistDocument,
    ApplyWriteBack { count: usize },
}

/// Pure state transition function
pub fn transition(
    state: SessionState,
    event: SessionEvent,
) -> (SessionState, Vec<SessionAction>) {
    match (state, event) {
        (SessionState::Initializing, SessionEvent::ParametersValid { requested }) => {
            let actions = vec![
                SessionAction::Log(format!("Session started for {} issues", requested)),
                SessionAction::FetchCandidates { requested },
            ];
            (SessionState::Fetching { requested }, actions)
        }

        (SessionState::Initializing, SessionEvent::ParametersInvalid { reason }) => (
            SessionState::Failed {
                error: reason.clone(),
            },
            vec![SessionAction::Log(format!("Invalid parameters: {}", reason))],
        ),

        (
            SessionState::Fetching { requested },
            SessionEvent::FetchSucceeded {
                candidates,
                shortfall,
            },
        ) => {
            let mut actions = vec![SessionAction::Log(format!(
                "Fetched {} candidates ({} requested)",
                candidates, requested
            ))];
            if let Some(reason) = &shortfall {
                actions.push(SessionAction::Log(format!("Shortfall: {}", reason)));
            }
            actions.push(SessionAction::AnalyzeIssues { count: candidates });
            (
                SessionState::Analyzing {
                    requested,
                    candidates,
                    shortfall,
                },
                actions,
            )
        }

        (SessionState::Fetching { .. }, SessionEvent::FetchFailed { reason }) => (
            SessionState::Failed {
                error: reason.clone(),
            },
            vec![SessionAction::Log(format!(
                "Retrieval failed, terminating session: {}",
                reason
            ))],
        ),

        (
            SessionState::Analyzing {
                requested,
                shortfall,
                ..
            },
            SessionEvent::AnalysisComplete { analyzed, failures },
        ) => {
            let actions = vec![
                SessionAction::Log(format!(
                    "Analysis complete: {} analyzed, {} failed",
                    analyzed, failures
                )),
                SessionAction::PersistDocument,
            ];
            (
                SessionState::Documenting {
                    requested,
                    analyzed,
                    issue_failures: failures,
                    shortfall,
                },
                actions,
            )
        }

        (
            SessionState::Documenting {
                requested,
                analyzed,
                issue_failures,
                shortfall,
            },
            SessionEvent::DocumentPersisted,
        ) => {
            let actions = vec![
                SessionAction::Log("Session document persisted".to_string()),
                SessionAction::ApplyWriteBack { count: analyzed },
            ];
            (
                SessionState::WritingBack {
                    requested,
                    analyzed,
                    issue_failures,
                    shortfall,
                },
                actions,
            )
        }

        (
            SessionState::WritingBack {
                requested,
                analyzed,
                issue_failures,
                shortfall,
            },
            SessionEvent::WriteBackComplete { failures },
        ) => {
            let mut reasons = Vec::new();
            if let Some(reason) = shortfall {
                reasons.push(reason);
            }
            if issue_failures > 0 {
                reasons.push(format!(
                    "{} issues failed analysis and were excluded",
                    issue_failures
                ));
            }
            if failures > 0 {
                reasons.push(format!("{} write-back attempts failed", failures));
            }
            if analyzed < requested && reasons.is_empty() {
                reasons.push(format!(
                    "analyzed {} of {} requested issues",
                    analyzed, requested
                ));
            }

            if analyzed == requested && reasons.is_empty() {
                (
                    SessionState::Completed { analyzed },
                    vec![SessionAction::Log(format!(
                        "Session completed: {} issues reviewed",
                        analyzed
                    ))],
                )
            } else {
                (
                    SessionState::PartialCompletion {
                        analyzed,
                        reasons: reasons.clone(),
                    },
                    vec![SessionAction::Log(format!(
                        "Session partially completed: {}",
                        reasons.join("; ")
                    ))],
                )
            }
        }

        // Terminal states reject all events
        (SessionState::Completed { analyzed }, event) => (
            SessionState::Failed {
                error: format!(
                    "Invalid transition from Completed ({} analyzed) on event: {:?}",
                    analyzed, event
                ),
            },
            vec![],
        ),

        (SessionState::Failed { error }, event) => (
            SessionState::Failed {
                error: format!(
                    "Invalid transition from Failed ({}) on event: {:?}",
                    error, event
                ),
            },
            vec![],
        ),

        (SessionState::PartialCompletion { analyzed, .. }, event) => (
            SessionState::Failed {
                error: format!(
                    "Invalid transition from PartialCompletion ({} analyzed) on event: {:?}",
                    analyzed, event
                ),
            },
            vec![],
        ),

        // All other invalid transitions
        (state, event) => (
            SessionState::Failed {
                error: format!(
                    "Invalid state transition: {:?} cannot handle event {:?}",
                    state, event
                ),
            },
            vec![],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_writing_back(
        requested: usize,
        candidates: usize,
        shortfall: Option<String>,
        analyzed: usize,
        failures: usize,
    ) -> SessionState {
        let (state, _) = transition(
            SessionState::Initializing,
            SessionEvent::ParametersValid { requested },
        );
        let (state, _) = transition(
            state,
            SessionEvent::FetchSucceeded {
                candidates,
                shortfall,
            },
        );
        let (state, _) = transition(
            state,
            SessionEvent::AnalysisComplete { analyzed, failures },
        );
        let (state, _) = transition(state, SessionEvent::DocumentPersisted);
        state
    }

    #[test]
    fn test_happy_path_reaches_completed() {
        let (state, actions) = transition(
            SessionState::Initializing,
            SessionEvent::ParametersValid { requested: 3 },
        );
        assert!(matches!(state, SessionState::Fetching { requested: 3 }));
        assert!(actions
            .iter()
            .any(|a| matches!(a, SessionAction::FetchCandidates { requested: 3 })));

        let (state, actions) = transition(
            state,
            SessionEvent::FetchSucceeded {
                candidates: 3,
                shortfall: None,
            },
        );
        assert!(matches!(state, SessionState::Analyzing { .. }));
        assert!(actions
            .iter()
            .any(|a| matches!(a, SessionAction::AnalyzeIssues { count: 3 })));

        let (state, actions) = transition(
            state,
            SessionEvent::AnalysisComplete {
                analyzed: 3,
                failures: 0,
            },
        );
        assert!(matches!(state, SessionState::Documenting { .. }));
        assert!(actions.contains(&SessionAction::PersistDocument));

        let (state, actions) = transition(state, SessionEvent::DocumentPersisted);
        assert!(matches!(state, SessionState::WritingBack { .. }));
        assert!(actions
            .iter()
            .any(|a| matches!(a, SessionAction::ApplyWriteBack { count: 3 })));

        let (state, _) = transition(state, SessionEvent::WriteBackComplete { failures: 0 });
        assert_eq!(state, SessionState::Completed { analyzed: 3 });
    }

    #[test]
    fn test_invalid_parameters_fail_before_any_fetch() {
        let (state, actions) = transition(
            SessionState::Initializing,
            SessionEvent::ParametersInvalid {
                reason: "max_issues must be positive".to_string(),
            },
        );
        assert!(matches!(state, SessionState::Failed { .. }));
        assert!(!actions
            .iter()
            .any(|a| matches!(a, SessionAction::FetchCandidates { .. })));
    }

    #[test]
    fn test_fetch_failure_terminates_without_document() {
        let (state, _) = transition(
            SessionState::Initializing,
            SessionEvent::ParametersValid { requested: 5 },
        );
        let (state, actions) = transition(
            state,
            SessionEvent::FetchFailed {
                reason: "backlog unreachable after retries".to_string(),
            },
        );
        assert!(matches!(state, SessionState::Failed { .. }));
        assert!(!actions.contains(&SessionAction::PersistDocument));
    }

    #[test]
    fn test_shortfall_forces_partial_completion() {
        let state = run_to_writing_back(
            12,
            11,
            Some("only 11 distinct candidates".to_string()),
            11,
            0,
        );
        let (state, _) = transition(state, SessionEvent::WriteBackComplete { failures: 0 });

        match state {
            SessionState::PartialCompletion { analyzed, reasons } => {
                assert_eq!(analyzed, 11);
                assert!(!reasons.is_empty());
                assert!(reasons[0].contains("11 distinct"));
            }
            other => panic!("expected PartialCompletion, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_completion_always_carries_a_reason() {
        // Even without an explicit shortfall reason, analyzing fewer
        // issues than requested records one.
        let state = run_to_writing_back(4, 4, None, 3, 0);
        let (state, _) = transition(state, SessionEvent::WriteBackComplete { failures: 0 });

        match state {
            SessionState::PartialCompletion { reasons, .. } => {
                assert!(!reasons.is_empty());
            }
            other => panic!("expected PartialCompletion, got {:?}", other),
        }
    }

    #[test]
    fn test_write_back_failures_force_partial_completion() {
        let state = run_to_writing_back(2, 2, None, 2, 0);
        let (state, _) = transition(state, SessionEvent::WriteBackComplete { failures: 1 });

        match state {
            SessionState::PartialCompletion { analyzed, reasons } => {
                assert_eq!(analyzed, 2);
                assert!(reasons[0].contains("write-back"));
            }
            other => panic!("expected PartialCompletion, got {:?}", other),
        }
    }

    #[test]
    fn test_analysis_failures_force_partial_completion() {
        let state = run_to_writing_back(3, 3, None, 2, 1);
        let (state, _) = transition(state, SessionEvent::WriteBackComplete { failures: 0 });

        match state {
            SessionState::PartialCompletion { reasons, .. } => {
                assert!(reasons[0].contains("failed analysis"));
            }
            other => panic!("expected PartialCompletion, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_transition_never_panics() {
        let (state, _) = transition(
            SessionState::Initializing,
            SessionEvent::DocumentPersisted,
        );
        assert!(matches!(state, SessionState::Failed { .. }));

        let (state, _) = transition(
            SessionState::Fetching { requested: 2 },
            SessionEvent::WriteBackComplete { failures: 0 },
        );
        assert!(matches!(state, SessionState::Failed { .. }));
    }

    #[test]
    fn test_terminal_states_reject_all_events() {
        let completed = SessionState::Completed { analyzed: 2 };
        let (state, _) = transition(completed, SessionEvent::DocumentPersisted);
        assert!(matches!(state, SessionState::Failed { .. }));

        let partial = SessionState::PartialCompletion {
            analyzed: 1,
            reasons: vec!["shortfall".to_string()],
        };
        let (state, _) = transition(partial, SessionEvent::WriteBackComplete { failures: 0 });
        assert!(matches!(state, SessionState::Failed { .. }));

        let failed = SessionState::Failed {
            error: "original".to_string(),
        };
        let (state, _) = transition(
            failed,
            SessionEvent::ParametersValid { requested: 1 },
        );
        assert!(matches!(state, SessionState::Failed { .. }));
    }

    #[test]
    fn test_zero_candidates_still_documents() {
        let state = run_to_writing_back(3, 0, Some("empty backlog".to_string()), 0, 0);
        assert!(matches!(state, SessionState::WritingBack { analyzed: 0, .. }));
    }
}

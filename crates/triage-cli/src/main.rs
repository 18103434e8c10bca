//! Triage CLI - recurring issue-triage review sessions
//!
//! Usage:
//!   triage init                 Write default config to .triage/
//!   triage review --date DATE   Run a review session
//!
//! A review session pulls unprioritized candidates from the backlog,
//! classifies each one, persists the session document, and writes the
//! derived labels back to the tracking platform.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use triage_core::{SessionParams, SessionStatus, TriageConfig};
use triage_engine::SessionRunner;
use triage_report::FsDocumentStore;
use triage_tracker::GithubTracker;

#[derive(Parser)]
#[command(name = "triage")]
#[command(author, version, about = "Recurring issue-triage review sessions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize triage configuration in the current repository
    Init {
        /// Repository path (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Run a review session
    Review {
        /// Session date, YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Maximum issues to review
        #[arg(short = 'n', long)]
        max_issues: Option<usize>,

        /// Backlog source, owner/repo
        #[arg(long)]
        backlog: Option<String>,

        /// Focus area (e.g. "bugs", "tools", "streaming")
        #[arg(long)]
        focus_area: Option<String>,

        /// Analyze and document without writing labels back
        #[arg(long)]
        dry_run: bool,
    },
}

/// Parse and validate the session date before any I/O happens
fn parse_meeting_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid session date '{}', expected YYYY-MM-DD", raw))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    match cli.command {
        Commands::Init { path } => {
            TriageConfig::write_default(&path)?;
            info!("Wrote default configuration to {:?}", path.join(".triage/config.toml"));
            Ok(())
        }

        Commands::Review {
            date,
            max_issues,
            backlog,
            focus_area,
            dry_run,
        } => {
            // Rejected before anything touches the network or disk.
            let meeting_date = parse_meeting_date(&date)?;
            if max_issues == Some(0) {
                bail!("--max-issues must be a positive integer");
            }

            let config = TriageConfig::load_or_default(&PathBuf::from("."))?;

            let backlog = backlog
                .or_else(|| config.backlog.clone())
                .context("no backlog given; pass --backlog or set it in .triage/config.toml")?;
            let max_issues = max_issues.unwrap_or(config.defaults.max_issues);
            let focus_area = focus_area.or_else(|| config.defaults.focus_area.clone());

            let mut params = SessionParams::new(meeting_date, max_issues, backlog);
            if let Some(focus) = focus_area {
                params = params.with_focus_area(focus);
            }

            let tracker = Arc::new(GithubTracker::from_env(config.retry.clone())?);
            let store = FsDocumentStore::new(&config.reports_dir);
            let runner = SessionRunner::new(tracker, store)
                .with_concurrency(config.analysis_concurrency)
                .with_dry_run(dry_run)
                .with_summary_comments(config.post_summary_comment);

            let outcome = runner.run(params).await?;
            let session = &outcome.session;

            println!("Review session {}: {}", session.params.meeting_date, session.status);
            println!(
                "  Analyzed {} of {} requested issues ({} ready for contribution)",
                session.analyzed_count(),
                session.requested_count,
                session.ready_count()
            );
            for (priority, count) in session.counts_by_priority() {
                if count > 0 {
                    println!("  {}: {}", priority, count);
                }
            }
            if let Some(reason) = &session.shortfall_reason {
                println!("  Shortfall: {}", reason);
            }
            for failure in &session.analysis_failures {
                println!("  Analysis failed for #{}: {}", failure.number, failure.reason);
            }
            for failure in &session.write_back_failures {
                println!("  Write-back failed for #{}: {}", failure.number, failure.reason);
            }
            println!("Review notes saved to {:?}", outcome.document_path);

            if session.status == SessionStatus::PartialCompletion {
                info!("Session ended in partial completion; see the document for details");
            }
            Ok(())
        }
    }
}

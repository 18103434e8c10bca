//! Configuration management for triage
//!
//! Repository-level settings are loaded from `.triage/config.toml`:
//! the default backlog, session defaults, the retry policy for
//! tracking-platform calls, and the reports directory.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::Result;

/// Repository-level triage configuration
///
/// Loaded from `.triage/config.toml` in the repo root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Default backlog source, `owner/repo`
    #[serde(default)]
    pub backlog: Option<String>,

    /// Session parameter defaults
    #[serde(default)]
    pub defaults: SessionDefaults,

    /// Retry policy for tracking-platform calls
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Maximum issues analyzed concurrently
    #[serde(default = "default_analysis_concurrency")]
    pub analysis_concurrency: usize,

    /// Directory where session documents are persisted
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,

    /// Post a summary comment on each issue during write-back
    #[serde(default)]
    pub post_summary_comment: bool,
}

/// Default session parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDefaults {
    /// Maximum issues per session when not given on the command line
    #[serde(default = "default_max_issues")]
    pub max_issues: usize,

    /// Default focus area
    #[serde(default)]
    pub focus_area: Option<String>,
}

/// Bounded retry with exponential backoff
///
/// Exhausting the budget on retrieval is fatal to the session; exhausting
/// it on a single write-back call is recorded as a per-issue failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before the second attempt
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: u64,

    /// Backoff ceiling
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (1-based), doubling each time
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(16);
        let secs = self
            .initial_backoff_secs
            .saturating_mul(1u64 << exp)
            .min(self.max_backoff_secs);
        Duration::from_secs(secs)
    }
}

// Default value providers
fn default_max_issues() -> usize {
    12
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_secs() -> u64 {
    2
}

fn default_max_backoff_secs() -> u64 {
    60
}

fn default_analysis_concurrency() -> usize {
    4
}

fn default_reports_dir() -> String {
    ".triage/reviews".to_string()
}

impl TriageConfig {
    /// Load configuration from `.triage/config.toml` or use defaults
    pub fn load_or_default(repo_root: &Path) -> Result<Self> {
        let config_path = repo_root.join(".triage/config.toml");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content).map_err(|e| {
                crate::TriageError::Config(format!("Failed to parse config file: {}", e))
            })?)
        } else {
            Ok(Self::default())
        }
    }

    /// Write default configuration to `.triage/config.toml`
    pub fn write_default(repo_root: &Path) -> Result<()> {
        let config_dir = repo_root.join(".triage");
        std::fs::create_dir_all(&config_dir)?;

        let config_path = config_dir.join("config.toml");
        let config = Self::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| crate::TriageError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            backlog: None,
            defaults: SessionDefaults::default(),
            retry: RetryPolicy::default(),
            analysis_concurrency: default_analysis_concurrency(),
            reports_dir: default_reports_dir(),
            post_summary_comment: false,
        }
    }
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            max_issues: default_max_issues(),
            focus_area: None,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_secs: default_initial_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

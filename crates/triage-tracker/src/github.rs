//! GitHub tracking-platform client
//!
//! Reads go through the GraphQL v4 API; label and comment write-backs go
//! through the REST v3 API. Every call runs inside a bounded retry loop
//! with exponential backoff. The read path refuses GraphQL mutation
//! documents outright.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};
use triage_core::{
    CandidateRecord, IssueSnapshot, Priority, Result, RetryPolicy, TriageError, PRIORITY_LABELS,
    READY_LABEL,
};

const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const GITHUB_REST_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "triage-review/0.1";

const SEARCH_QUERY: &str = r#"
query($owner: String!, $name: String!, $limit: Int!) {
  repository(owner: $owner, name: $name) {
    issues(first: $limit, states: OPEN, orderBy: {field: UPDATED_AT, direction: DESC}) {
      nodes {
        number
        title
        url
        createdAt
        labels(first: 20) { nodes { name } }
        comments { totalCount }
        reactions { totalCount }
      }
    }
  }
}
"#;

const FETCH_QUERY: &str = r#"
query($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    issue(number: $number) {
      number
      title
      url
      body
      createdAt
      updatedAt
      labels(first: 20) { nodes { name } }
      comments { totalCount }
      reactions { totalCount }
      timelineItems(itemTypes: [CROSS_REFERENCED_EVENT], first: 20) {
        nodes {
          ... on CrossReferencedEvent {
            source {
              ... on Issue { number }
              ... on PullRequest { number }
            }
          }
        }
      }
    }
  }
}
"#;

/// Whether a GraphQL document is a mutation
///
/// The read client only ever sends queries; anything that parses as a
/// mutation is refused before touching the network.
pub(crate) fn is_mutation_query(query: &str) -> bool {
    let trimmed = query.trim_start().to_lowercase();
    trimmed.starts_with("mutation")
}

fn encode_label(label: &str) -> String {
    label.replace(' ', "%20")
}

fn split_backlog(backlog: &str) -> Result<(&str, &str)> {
    backlog
        .split_once('/')
        .filter(|(owner, name)| !owner.is_empty() && !name.is_empty())
        .ok_or_else(|| {
            TriageError::InvalidParameters(format!(
                "backlog reference must be owner/repo, got: {}",
                backlog
            ))
        })
}

fn parse_datetime(value: &Value) -> DateTime<Utc> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

fn parse_labels(node: &Value) -> Vec<String> {
    node["labels"]["nodes"]
        .as_array()
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(|n| n["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_candidate(node: &Value) -> Option<CandidateRecord> {
    Some(CandidateRecord {
        number: node["number"].as_u64()?,
        title: node["title"].as_str()?.to_string(),
        url: node["url"].as_str()?.to_string(),
        labels: parse_labels(node),
        created_at: parse_datetime(&node["createdAt"]),
        comment_count: node["comments"]["totalCount"].as_u64().unwrap_or(0) as u32,
        reaction_count: node["reactions"]["totalCount"].as_u64().unwrap_or(0) as u32,
        is_pull_request: false,
        has_parent: false,
    })
}

fn parse_snapshot(node: &Value) -> Option<IssueSnapshot> {
    let linked = node["timelineItems"]["nodes"]
        .as_array()
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(|n| n["source"]["number"].as_u64())
                .collect()
        })
        .unwrap_or_default();

    Some(IssueSnapshot {
        number: node["number"].as_u64()?,
        title: node["title"].as_str()?.to_string(),
        url: node["url"].as_str()?.to_string(),
        body: node["body"].as_str().unwrap_or_default().to_string(),
        labels: parse_labels(node),
        linked,
        is_pull_request: false,
        comment_count: node["comments"]["totalCount"].as_u64().unwrap_or(0) as u32,
        reaction_count: node["reactions"]["totalCount"].as_u64().unwrap_or(0) as u32,
        created_at: parse_datetime(&node["createdAt"]),
        updated_at: parse_datetime(&node["updatedAt"]),
    })
}

/// GitHub-backed [`super::IssueTracker`] implementation
#[derive(Debug, Clone)]
pub struct GithubTracker {
    client: reqwest::Client,
    token: String,
    retry: RetryPolicy,
}

impl GithubTracker {
    /// Create a tracker with an explicit token
    pub fn new(token: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            retry,
        }
    }

    /// Create a tracker from the `GITHUB_TOKEN` environment variable
    pub fn from_env(retry: RetryPolicy) -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN").map_err(|_| {
            TriageError::Config(
                "GitHub token not found. Set the GITHUB_TOKEN environment variable.".to_string(),
            )
        })?;
        Ok(Self::new(token, retry))
    }

    /// Execute a read-only GraphQL query with the retry budget
    #[instrument(skip(self, query, variables))]
    async fn graphql(&self, query: &str, variables: Value) -> Result<Value> {
        if is_mutation_query(query) {
            return Err(TriageError::Tracker(
                "mutation operations are disabled on the read client".to_string(),
            ));
        }

        let payload = json!({ "query": query, "variables": variables });
        let mut retries = 0;

        loop {
            debug!("Sending GraphQL request (attempt {})", retries + 1);

            let response = self
                .client
                .post(GITHUB_GRAPHQL_URL)
                .bearer_auth(&self.token)
                .header("user-agent", USER_AGENT)
                .json(&payload)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    retries += 1;
                    if retries >= self.retry.max_attempts {
                        return Err(TriageError::Tracker(format!(
                            "request failed after {} attempts: {}",
                            self.retry.max_attempts, e
                        )));
                    }
                    let wait = self.retry.backoff_for(retries);
                    warn!("Request error ({}). Retrying in {:?}", e, wait);
                    tokio::time::sleep(wait).await;
                    continue;
                }
            };

            let status = response.status();

            // Rate limits and server errors are retryable
            if status.as_u16() == 429 || status.is_server_error() {
                retries += 1;
                if retries >= self.retry.max_attempts {
                    return Err(TriageError::Tracker(format!(
                        "status {} after {} attempts",
                        status, self.retry.max_attempts
                    )));
                }
                let wait = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(std::time::Duration::from_secs)
                    .unwrap_or_else(|| self.retry.backoff_for(retries));
                warn!(
                    "GitHub returned {}. Retrying in {:?} ({}/{})",
                    status, wait, retries, self.retry.max_attempts
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                let text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown".to_string());
                return Err(TriageError::Tracker(format!(
                    "GitHub API error {}: {}",
                    status, text
                )));
            }

            let body: Value = response
                .json()
                .await
                .map_err(|e| TriageError::Tracker(format!("failed to parse response: {}", e)))?;

            if let Some(errors) = body["errors"].as_array().filter(|e| !e.is_empty()) {
                let messages: Vec<&str> = errors
                    .iter()
                    .filter_map(|e| e["message"].as_str())
                    .collect();
                return Err(TriageError::Tracker(format!(
                    "GraphQL errors: {}",
                    messages.join("; ")
                )));
            }

            return Ok(body["data"].clone());
        }
    }

    /// Execute a REST call with the retry budget
    ///
    /// `tolerate_missing` treats 404 as success (used when removing a
    /// label the issue may not carry).
    async fn rest(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
        tolerate_missing: bool,
    ) -> Result<()> {
        let url = format!("{}{}", GITHUB_REST_URL, path);
        let mut retries = 0;

        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .bearer_auth(&self.token)
                .header("user-agent", USER_AGENT)
                .header("accept", "application/vnd.github+json");
            if let Some(ref b) = body {
                request = request.json(b);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    retries += 1;
                    if retries >= self.retry.max_attempts {
                        return Err(TriageError::Tracker(format!(
                            "request failed after {} attempts: {}",
                            self.retry.max_attempts, e
                        )));
                    }
                    tokio::time::sleep(self.retry.backoff_for(retries)).await;
                    continue;
                }
            };

            let status = response.status();

            if status.is_success() || (tolerate_missing && status.as_u16() == 404) {
                return Ok(());
            }

            if status.as_u16() == 429 || status.is_server_error() {
                retries += 1;
                if retries >= self.retry.max_attempts {
                    return Err(TriageError::Tracker(format!(
                        "status {} after {} attempts",
                        status, self.retry.max_attempts
                    )));
                }
                let wait = self.retry.backoff_for(retries);
                warn!("GitHub returned {}. Retrying in {:?}", status, wait);
                tokio::time::sleep(wait).await;
                continue;
            }

            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(TriageError::Tracker(format!(
                "GitHub API error {}: {}",
                status, text
            )));
        }
    }
}

#[async_trait]
impl super::IssueTracker for GithubTracker {
    async fn search_candidates(
        &self,
        backlog: &str,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>> {
        let (owner, name) = split_backlog(backlog)?;
        let variables = json!({ "owner": owner, "name": name, "limit": limit as u64 });

        let data = self
            .graphql(SEARCH_QUERY, variables)
            .await
            .map_err(|e| TriageError::SourceUnavailable(e.to_string()))?;

        let nodes = data["repository"]["issues"]["nodes"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        Ok(nodes.iter().filter_map(parse_candidate).collect())
    }

    async fn fetch_issue(&self, backlog: &str, number: u64) -> Result<IssueSnapshot> {
        let (owner, name) = split_backlog(backlog)?;
        let variables = json!({ "owner": owner, "name": name, "number": number });

        let data = self.graphql(FETCH_QUERY, variables).await?;
        parse_snapshot(&data["repository"]["issue"]).ok_or_else(|| {
            TriageError::Tracker(format!("issue {}#{} not found", backlog, number))
        })
    }

    async fn set_priority_label(
        &self,
        backlog: &str,
        number: u64,
        priority: Priority,
    ) -> Result<()> {
        // Drop any other priority level first so exactly one remains
        for label in PRIORITY_LABELS {
            if label == priority.label() {
                continue;
            }
            self.rest(
                reqwest::Method::DELETE,
                &format!(
                    "/repos/{}/issues/{}/labels/{}",
                    backlog,
                    number,
                    encode_label(label)
                ),
                None,
                true,
            )
            .await?;
        }

        self.rest(
            reqwest::Method::POST,
            &format!("/repos/{}/issues/{}/labels", backlog, number),
            Some(json!({ "labels": [priority.label()] })),
            false,
        )
        .await
    }

    async fn add_ready_label(&self, backlog: &str, number: u64) -> Result<()> {
        self.rest(
            reqwest::Method::POST,
            &format!("/repos/{}/issues/{}/labels", backlog, number),
            Some(json!({ "labels": [READY_LABEL] })),
            false,
        )
        .await
    }

    async fn post_comment(&self, backlog: &str, number: u64, body: &str) -> Result<()> {
        self.rest(
            reqwest::Method::POST,
            &format!("/repos/{}/issues/{}/comments", backlog, number),
            Some(json!({ "body": body })),
            false,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_guard() {
        assert!(is_mutation_query("mutation { addLabels }"));
        assert!(is_mutation_query("  \n MUTATION AddLabels { }"));
        assert!(!is_mutation_query(SEARCH_QUERY));
        assert!(!is_mutation_query(FETCH_QUERY));
    }

    #[test]
    fn test_split_backlog() {
        assert_eq!(split_backlog("acme/widgets").unwrap(), ("acme", "widgets"));
        assert!(split_backlog("no-slash").is_err());
        assert!(split_backlog("/widgets").is_err());
    }

    #[test]
    fn test_encode_label() {
        assert_eq!(encode_label("ready for contribution"), "ready%20for%20contribution");
        assert_eq!(encode_label("Medium-High"), "Medium-High");
    }

    #[test]
    fn test_parse_candidate() {
        let node = json!({
            "number": 17,
            "title": "Retries ignore backoff",
            "url": "https://github.com/acme/widgets/issues/17",
            "createdAt": "2026-06-01T10:00:00Z",
            "labels": { "nodes": [ { "name": "bug" } ] },
            "comments": { "totalCount": 4 },
            "reactions": { "totalCount": 7 }
        });

        let candidate = parse_candidate(&node).unwrap();
        assert_eq!(candidate.number, 17);
        assert_eq!(candidate.labels, vec!["bug".to_string()]);
        assert_eq!(candidate.comment_count, 4);
        assert_eq!(candidate.reaction_count, 7);
        assert!(!candidate.is_pull_request);
    }

    #[test]
    fn test_parse_snapshot_with_links() {
        let node = json!({
            "number": 17,
            "title": "Retries ignore backoff",
            "url": "https://github.com/acme/widgets/issues/17",
            "body": "Details here.",
            "createdAt": "2026-06-01T10:00:00Z",
            "updatedAt": "2026-06-02T10:00:00Z",
            "labels": { "nodes": [] },
            "comments": { "totalCount": 1 },
            "reactions": { "totalCount": 0 },
            "timelineItems": { "nodes": [
                { "source": { "number": 21 } },
                { "source": {} }
            ] }
        });

        let snapshot = parse_snapshot(&node).unwrap();
        assert_eq!(snapshot.linked, vec![21]);
        assert_eq!(snapshot.body, "Details here.");
    }

    #[test]
    fn test_parse_snapshot_missing_issue() {
        assert!(parse_snapshot(&Value::Null).is_none());
    }
}

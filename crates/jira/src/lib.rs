//! Tattle JIRA infrastructure adapter.
//!
//! Implements the [`query::IssueTracker`] trait over the JIRA REST API
//! (`https://{team}.atlassian.net/rest/api/2/issue/{key}?fields=status`).
//! Issue reads are unauthenticated; rate limiting is the tracker's policy,
//! not ours.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport and payload parsing only. The status string
//! is handed straight to [`query::IssueStatus`]'s parser, so an unrecognized
//! workflow status is a typed error rather than a value smuggled into the
//! report.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use query::{Issue, IssueKey, IssueStatus, IssueTracker, QueryError};

/// An [`IssueTracker`] over the JIRA REST API.
#[derive(Debug, Default)]
pub struct JiraClient {
    http: reqwest::Client,
}

impl JiraClient {
    /// Creates a client. No credentials: issue reads are anonymous.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn issue(&self, team: &str, key: &IssueKey) -> Result<Issue, QueryError> {
        let url = format!("https://{team}.atlassian.net/rest/api/2/issue/{key}?fields=status");
        debug!(url, "jira GET");
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| QueryError::Fetch {
                url: url.clone(),
                source: source.into(),
            })?;
        let record: IssueRecord =
            response
                .json()
                .await
                .map_err(|source| QueryError::MalformedResponse {
                    url: url.clone(),
                    detail: source.to_string(),
                })?;
        record.into_issue(&url)
    }
}

/// The subset of the issue payload Tattle reads.
#[derive(Debug, Deserialize)]
struct IssueRecord {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    status: StatusField,
}

#[derive(Debug, Deserialize)]
struct StatusField {
    name: String,
}

impl IssueRecord {
    fn into_issue(self, url: &str) -> Result<Issue, QueryError> {
        let key = IssueKey::new(self.key).ok_or_else(|| QueryError::MalformedResponse {
            url: url.to_string(),
            detail: "issue payload with an empty key".to_string(),
        })?;
        let status = self.fields.status.name.parse::<IssueStatus>()?;
        Ok(Issue::new(key, status))
    }
}

//! Port traits implemented by the remote-API adapter crates.
//!
//! The pipeline in [`crate::query`] is written entirely against these traits;
//! transport, authentication, and payload parsing live behind them. Tests
//! drive the pipeline with in-memory fakes.

use async_trait::async_trait;

use crate::errors::QueryError;
use crate::identifiers::{IssueKey, OrgName};
use crate::types::{Branch, Issue, RawBranch, Repo};

/// Read access to a GitHub-shaped repository host.
#[async_trait]
pub trait GitHubHost: Send + Sync {
    /// Returns the organization's total repository count, public plus private.
    async fn repository_count(&self, org: &OrgName) -> Result<usize, QueryError>;

    /// Fetches one page (1-based) of the organization's repository listing.
    async fn repository_page(&self, org: &OrgName, page: usize) -> Result<Vec<Repo>, QueryError>;

    /// Fetches the raw branch-list entries of one repository.
    async fn branch_entries(&self, repo: &Repo) -> Result<Vec<RawBranch>, QueryError>;

    /// Fetches one branch's detail payload and extracts the last committer's
    /// email. A payload missing any segment of the expected path is a
    /// [`QueryError::MalformedResponse`], never a silent skip.
    async fn committer_email(&self, branch: &Branch) -> Result<String, QueryError>;
}

/// Read access to an issue tracker.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetches the issue identified by `key` from the given team's tracker.
    async fn issue(&self, team: &str, key: &IssueKey) -> Result<Issue, QueryError>;
}

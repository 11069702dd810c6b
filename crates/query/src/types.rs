//! Domain entities.
//!
//! [`Branch`] is the central record: enumerated from GitHub, narrowed by the
//! filter chain (which may link an [`Issue`] onto it), and finally enriched
//! with its last committer's email. Serialization of these types is the
//! report's wire format, so the field names here are load-bearing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::QueryError;
use crate::identifiers::{BranchName, IssueKey, OrgName, RepoName};

// The authoritative source of a branch's owning repository: the commit URL
// embedded in the branch-list entry, not the repository the list was fetched
// for.
static COMMIT_URL_RE: LazyLock<Regex> = LazyLock::new(
    || match Regex::new(r"^https://api\.github\.com/repos/([^/]+)/([^/]+)/commits/([^/]+)$") {
        Ok(re) => re,
        Err(_) => unreachable!("static commit url pattern"),
    },
);

/// A GitHub account that owns repositories. Root of all queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    name: OrgName,
}

impl Organization {
    /// Creates an organization from its login name.
    pub fn new(name: OrgName) -> Self {
        Self { name }
    }

    /// Returns the organization's login name.
    pub fn name(&self) -> &OrgName {
        &self.name
    }
}

impl std::fmt::Display for Organization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A repository, owned by exactly one [`Organization`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    name: RepoName,
    organization: Organization,
}

impl Repo {
    /// Creates a repository record.
    pub fn new(name: RepoName, organization: Organization) -> Self {
        Self { name, organization }
    }

    /// Returns the repository name.
    pub fn name(&self) -> &RepoName {
        &self.name
    }

    /// Returns the owning organization.
    pub fn organization(&self) -> &Organization {
        &self.organization
    }
}

impl std::fmt::Display for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A raw branch-list entry as returned by the GitHub adapter: the branch name
/// plus the embedded commit URL the owner is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBranch {
    /// The branch name.
    pub name: String,
    /// The `commit.url` field of the branch-list entry.
    pub commit_url: String,
}

/// A named pointer into a repository's history, carrying the query's two
/// enrichment slots.
///
/// The owning repository is derived once, from the raw entry's commit URL,
/// and never changes afterwards. `jira_issue` is set by the filter chain
/// during issue resolution; `committer_email` by detail enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    name: BranchName,
    repo: Repo,
    jira_issue: Option<Issue>,
    committer_email: Option<String>,
}

impl Branch {
    /// Builds a branch from a raw branch-list entry, deriving the owning
    /// repository from the embedded commit URL.
    ///
    /// Fails fast with [`QueryError::CommitUrlPattern`] when the URL does not
    /// match the GitHub commits pattern; a branch with an undefined owner is
    /// never produced.
    pub fn from_entry(entry: RawBranch) -> Result<Self, QueryError> {
        let (repo_name, org_name) = extract_repo_data(&entry.commit_url)?;
        let name = BranchName::new(entry.name).ok_or_else(|| QueryError::MalformedResponse {
            url: entry.commit_url.clone(),
            detail: "branch entry has an empty name".to_string(),
        })?;
        Ok(Self {
            name,
            repo: Repo::new(repo_name, Organization::new(org_name)),
            jira_issue: None,
            committer_email: None,
        })
    }

    /// Test/construction helper used by fakes: a branch with both enrichment
    /// slots empty.
    pub fn new(name: BranchName, repo: Repo) -> Self {
        Self {
            name,
            repo,
            jira_issue: None,
            committer_email: None,
        }
    }

    /// Returns the branch name.
    pub fn name(&self) -> &BranchName {
        &self.name
    }

    /// Returns the owning repository.
    pub fn repo(&self) -> &Repo {
        &self.repo
    }

    /// Returns the linked issue, if issue resolution has run and found one.
    pub fn jira_issue(&self) -> Option<&Issue> {
        self.jira_issue.as_ref()
    }

    /// Returns the last committer's email, if detail enrichment has run.
    pub fn committer_email(&self) -> Option<&str> {
        self.committer_email.as_deref()
    }

    /// Links the positionally matched issue (or clears the slot for an
    /// absent key).
    pub fn link_issue(&mut self, issue: Option<Issue>) {
        self.jira_issue = issue;
    }

    /// Records the committer email extracted from the branch's detail payload.
    pub fn record_committer(&mut self, email: String) {
        self.committer_email = Some(email);
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Derives `(repository name, organization name)` from a commit URL.
fn extract_repo_data(commit_url: &str) -> Result<(RepoName, OrgName), QueryError> {
    let captures = COMMIT_URL_RE
        .captures(commit_url)
        .ok_or_else(|| QueryError::CommitUrlPattern {
            url: commit_url.to_string(),
        })?;
    let org = OrgName::new(&captures[1]);
    let repo = RepoName::new(&captures[2]);
    match (repo, org) {
        (Some(repo), Some(org)) => Ok((repo, org)),
        _ => Err(QueryError::CommitUrlPattern {
            url: commit_url.to_string(),
        }),
    }
}

/// An issue-tracker ticket: key plus workflow status. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    key: IssueKey,
    status: IssueStatus,
}

impl Issue {
    /// Creates an issue record.
    pub fn new(key: IssueKey, status: IssueStatus) -> Self {
        Self { key, status }
    }

    /// Returns the issue key.
    pub fn key(&self) -> &IssueKey {
        &self.key
    }

    /// Returns the workflow status.
    pub fn status(&self) -> IssueStatus {
        self.status
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "key: {}, status: {}", self.key, self.status)
    }
}

/// The closed set of recognized issue workflow statuses.
///
/// A status string from configuration or from a tracker response that is not
/// in this set is a typed error ([`QueryError::UnknownStatus`]), never an
/// arbitrary string carried along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
    Assigned,
    #[serde(rename = "Build Broken")]
    BuildBroken,
    Building,
    Closed,
    Done,
    #[serde(rename = "Info Needed")]
    InfoNeeded,
    #[serde(rename = "In Progress")]
    InProgress,
    Open,
    Pending,
    #[serde(rename = "Pull Request")]
    PullRequest,
    Reopened,
    Resolved,
    Stopped,
    #[serde(rename = "To Do")]
    ToDo,
}

impl IssueStatus {
    /// Every recognized status, in declaration order. This is the default
    /// allow-set for an issue filter with no configured statuses.
    pub const ALL: [IssueStatus; 14] = [
        IssueStatus::Assigned,
        IssueStatus::BuildBroken,
        IssueStatus::Building,
        IssueStatus::Closed,
        IssueStatus::Done,
        IssueStatus::InfoNeeded,
        IssueStatus::InProgress,
        IssueStatus::Open,
        IssueStatus::Pending,
        IssueStatus::PullRequest,
        IssueStatus::Reopened,
        IssueStatus::Resolved,
        IssueStatus::Stopped,
        IssueStatus::ToDo,
    ];

    /// Returns the status as the tracker spells it.
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Assigned => "Assigned",
            IssueStatus::BuildBroken => "Build Broken",
            IssueStatus::Building => "Building",
            IssueStatus::Closed => "Closed",
            IssueStatus::Done => "Done",
            IssueStatus::InfoNeeded => "Info Needed",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Open => "Open",
            IssueStatus::Pending => "Pending",
            IssueStatus::PullRequest => "Pull Request",
            IssueStatus::Reopened => "Reopened",
            IssueStatus::Resolved => "Resolved",
            IssueStatus::Stopped => "Stopped",
            IssueStatus::ToDo => "To Do",
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for IssueStatus {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| QueryError::UnknownStatus {
                value: s.to_string(),
            })
    }
}

//! Tattle GitHub infrastructure adapter.
//!
//! Implements the [`query::GitHubHost`] trait over the GitHub REST API with
//! [`reqwest`]. Four endpoints are used: organization metadata (repository
//! counts), the paginated repository listing, per-repository branch lists,
//! and per-branch detail.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. URL
//! construction, authentication, and payload parsing live here; the [`query`]
//! crate never sees them. The one domain decision in the neighbourhood —
//! deriving a branch's owner from its commit URL — stays in `query`, which is
//! why branch lists cross the boundary as [`query::RawBranch`] entries.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use query::{
    Branch, GitHubHost, OrgName, QueryError, RawBranch, Repo, RepoName, ITEMS_PER_PAGE,
};

/// Production API root.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// The two opaque credential strings used for HTTP basic auth.
///
/// Explicitly constructed and handed to the client; lifecycle is one run.
#[derive(Debug, Clone)]
pub struct Credentials {
    user: String,
    pass: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }
}

/// A [`GitHubHost`] over the GitHub REST API.
#[derive(Debug)]
pub struct GithubClient {
    http: reqwest::Client,
    credentials: Credentials,
    base_url: String,
}

impl GithubClient {
    /// Creates a client against the production API.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(credentials, GITHUB_API_URL)
    }

    /// Creates a client against an alternate API root.
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, QueryError> {
        debug!(url, "github GET");
        let response = self
            .http
            .get(url)
            .basic_auth(&self.credentials.user, Some(&self.credentials.pass))
            .header(reqwest::header::USER_AGENT, "tattle")
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| QueryError::Fetch {
                url: url.to_string(),
                source: source.into(),
            })?;
        response
            .json::<T>()
            .await
            .map_err(|source| QueryError::MalformedResponse {
                url: url.to_string(),
                detail: source.to_string(),
            })
    }
}

#[async_trait]
impl GitHubHost for GithubClient {
    async fn repository_count(&self, org: &OrgName) -> Result<usize, QueryError> {
        let url = format!("{}/orgs/{org}", self.base_url);
        let metadata: OrgMetadata = self.get_json(&url).await?;
        Ok(metadata.public_repos + metadata.total_private_repos)
    }

    async fn repository_page(&self, org: &OrgName, page: usize) -> Result<Vec<Repo>, QueryError> {
        let url = format!(
            "{}/orgs/{org}/repos?page={page}&per_page={ITEMS_PER_PAGE}",
            self.base_url
        );
        let records: Vec<RepoRecord> = self.get_json(&url).await?;
        records
            .into_iter()
            .map(|record| record.into_repo(&url))
            .collect()
    }

    async fn branch_entries(&self, repo: &Repo) -> Result<Vec<RawBranch>, QueryError> {
        let url = format!(
            "{}/repos/{}/{}/branches",
            self.base_url,
            repo.organization().name(),
            repo.name()
        );
        let records: Vec<BranchRecord> = self.get_json(&url).await?;
        Ok(records
            .into_iter()
            .map(|record| RawBranch {
                name: record.name,
                commit_url: record.commit.url,
            })
            .collect())
    }

    async fn committer_email(&self, branch: &Branch) -> Result<String, QueryError> {
        let url = format!(
            "{}/repos/{}/{}/branches/{}",
            self.base_url,
            branch.repo().organization().name(),
            branch.repo().name(),
            branch.name()
        );
        // Every segment of commit.commit.author.email is a required field of
        // the detail records below, so a payload missing any of them surfaces
        // as MalformedResponse from get_json.
        let detail: BranchDetail = self.get_json(&url).await?;
        Ok(detail.commit.commit.author.email)
    }
}

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

/// `GET /orgs/{org}` — only the repository counts are read; absent counts
/// mean zero.
#[derive(Debug, Deserialize)]
struct OrgMetadata {
    #[serde(default)]
    public_repos: usize,
    #[serde(default)]
    total_private_repos: usize,
}

/// One entry of `GET /orgs/{org}/repos`.
#[derive(Debug, Deserialize)]
struct RepoRecord {
    name: String,
    owner: RepoOwner,
}

#[derive(Debug, Deserialize)]
struct RepoOwner {
    login: String,
}

impl RepoRecord {
    fn into_repo(self, url: &str) -> Result<Repo, QueryError> {
        let name = RepoName::new(self.name);
        let owner = OrgName::new(self.owner.login);
        match (name, owner) {
            (Some(name), Some(owner)) => Ok(Repo::new(name, query::Organization::new(owner))),
            _ => Err(QueryError::MalformedResponse {
                url: url.to_string(),
                detail: "repository entry with an empty name or owner login".to_string(),
            }),
        }
    }
}

/// One entry of `GET /repos/{org}/{repo}/branches`.
#[derive(Debug, Deserialize)]
struct BranchRecord {
    name: String,
    commit: CommitRef,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    url: String,
}

/// `GET /repos/{org}/{repo}/branches/{branch}` — the committer email path.
#[derive(Debug, Deserialize)]
struct BranchDetail {
    commit: DetailCommit,
}

#[derive(Debug, Deserialize)]
struct DetailCommit {
    commit: CommitData,
}

#[derive(Debug, Deserialize)]
struct CommitData {
    author: CommitAuthor,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    email: String,
}

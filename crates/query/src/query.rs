//! Query configuration and the branch-query pipeline.
//!
//! The pipeline runs in four stages: paginated repository fetch, branch
//! enumeration (with owner derivation and a name sort), the filter chain
//! (with lazy, at-most-once issue resolution), and detail enrichment. All
//! remote batches go through [`crate::fanout::ordered_map`], so every
//! positional zip below is sound.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::info;

use crate::errors::QueryError;
use crate::fanout::{ordered_map, worker_count, NO_WORKER_LIMIT};
use crate::filters::{order_by_precedence, Filter, IssueFilter};
use crate::identifiers::OrgName;
use crate::ports::{GitHubHost, IssueTracker};
use crate::report::QueryReport;
use crate::types::{Branch, Organization, Repo};

/// GitHub listing page size.
pub const ITEMS_PER_PAGE: usize = 100;

/// The kind of data a query enumerates. Only branches today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Enumerate and filter branches.
    Branch,
}

/// Configuration shape of the `query_config` section of the YAML document.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfigSpec {
    /// The query kind; only `"branch"` is supported.
    pub data_type: String,
    /// Concurrency ceiling for fetch batches. Absent means unbounded.
    #[serde(default)]
    pub thread_limit: Option<usize>,
    /// The GitHub organization to query.
    pub github_org: String,
    /// Report destination. Absent means `<tmp>/tattle/report.json`.
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

/// Validated, immutable per-run configuration.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// The query kind.
    pub data_type: DataType,
    /// Concurrency ceiling ([`NO_WORKER_LIMIT`] when unbounded).
    pub thread_limit: usize,
    /// The organization under query.
    pub github_org: Organization,
    /// Report destination path.
    pub output_path: PathBuf,
}

impl QueryConfig {
    /// Validates a configuration spec.
    pub fn from_spec(spec: QueryConfigSpec) -> Result<Self, QueryError> {
        let data_type = match spec.data_type.as_str() {
            "branch" => DataType::Branch,
            other => {
                return Err(QueryError::UnsupportedDataType {
                    value: other.to_string(),
                })
            }
        };
        let org = OrgName::new(spec.github_org)
            .ok_or_else(|| QueryError::configuration("github_org must not be empty"))?;
        Ok(Self {
            data_type,
            thread_limit: spec.thread_limit.unwrap_or(NO_WORKER_LIMIT),
            github_org: Organization::new(org),
            output_path: spec.output_path.unwrap_or_else(default_output_path),
        })
    }
}

fn default_output_path() -> PathBuf {
    std::env::temp_dir().join("tattle").join("report.json")
}

/// One branch query: configuration, an ordered filter chain, and handles to
/// the two remote APIs.
///
/// Lifecycle is enforced through ownership: filters are attached on
/// `&mut self`, then [`BranchQuery::query`] consumes the value and yields a
/// [`QueryReport`], so a query can never execute twice.
pub struct BranchQuery<'a> {
    config: QueryConfig,
    filters: Vec<Filter>,
    github: &'a dyn GitHubHost,
    tracker: &'a dyn IssueTracker,
}

impl<'a> BranchQuery<'a> {
    /// Creates a query with an empty filter chain.
    pub fn new(
        config: QueryConfig,
        github: &'a dyn GitHubHost,
        tracker: &'a dyn IssueTracker,
    ) -> Self {
        Self {
            config,
            filters: Vec::new(),
            github,
            tracker,
        }
    }

    /// Attaches the filter chain, ordered by precedence ascending with ties
    /// keeping their configured order.
    pub fn attach_filters(&mut self, filters: Vec<Filter>) {
        self.filters = order_by_precedence(filters);
    }

    /// Executes the full pipeline and returns the assembled report.
    pub async fn query(self) -> Result<QueryReport, QueryError> {
        let repos = self.fetch_repositories().await?;
        let branches = self.enumerate_branches(repos).await?;
        let mut branches = self.apply_filters(branches).await?;
        self.enrich_details(&mut branches).await?;
        Ok(QueryReport::new(branches, self.config.output_path))
    }

    /// Fetches every page of the organization's repository listing, bounded
    /// by the configured ceiling. Page results are flattened in page order,
    /// but callers must not rely on repository order.
    async fn fetch_repositories(&self) -> Result<Vec<Repo>, QueryError> {
        let org = self.config.github_org.name().clone();
        info!(org = %org, "retrieving github repositories");

        let total = self.github.repository_count(&org).await?;
        let num_pages = total.div_ceil(ITEMS_PER_PAGE);
        let workers = worker_count(self.config.thread_limit, total, ITEMS_PER_PAGE);
        let github = self.github;

        let pages: Vec<usize> = (1..=num_pages).collect();
        let page_results = ordered_map(pages, workers, |page| {
            let org = org.clone();
            async move { github.repository_page(&org, page).await }
        })
        .await?;

        Ok(page_results.into_iter().flatten().collect())
    }

    /// Fetches every repository's branch list concurrently, derives each
    /// branch's owner from its commit URL, and sorts the flattened collection
    /// by branch name (stable, case-sensitive).
    async fn enumerate_branches(&self, repos: Vec<Repo>) -> Result<Vec<Branch>, QueryError> {
        info!(org = %self.config.github_org.name(), "retrieving basic github branch info");

        let workers = worker_count(self.config.thread_limit, repos.len(), 1);
        let github = self.github;
        let entry_lists = ordered_map(repos, workers, |repo| async move {
            github.branch_entries(&repo).await
        })
        .await?;

        let mut branches = entry_lists
            .into_iter()
            .flatten()
            .map(Branch::from_entry)
            .collect::<Result<Vec<_>, _>>()?;
        branches.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(branches)
    }

    /// Threads the working collection through the filter chain in attached
    /// order. The first issue filter encountered triggers issue resolution
    /// for the branches alive at that moment; later issue filters reuse the
    /// already-linked issues.
    async fn apply_filters(&self, mut branches: Vec<Branch>) -> Result<Vec<Branch>, QueryError> {
        let mut issues_resolved = false;
        for filter in &self.filters {
            if let Filter::Issue(issue_filter) = filter {
                if !issues_resolved {
                    self.resolve_issues(&mut branches, issue_filter).await?;
                    issues_resolved = true;
                }
            }
            branches.retain(|branch| filter.admits(branch));
        }
        Ok(branches)
    }

    /// Derives an issue key per branch, fetches the keyed issues concurrently
    /// (an absent key yields no issue, not an error), and zips the results
    /// back onto the branches positionally.
    async fn resolve_issues(
        &self,
        branches: &mut [Branch],
        filter: &IssueFilter,
    ) -> Result<(), QueryError> {
        info!(
            team = filter.jira_team_name(),
            branches = branches.len(),
            "resolving linked issues"
        );

        let keys: Vec<_> = branches
            .iter()
            .map(|branch| filter.transform().derive_key(branch.name().as_str()))
            .collect();
        let workers = worker_count(self.config.thread_limit, keys.len(), 1);
        let tracker = self.tracker;
        let team = filter.jira_team_name().to_string();

        let issues = ordered_map(keys, workers, |key| {
            let team = team.clone();
            async move {
                match key {
                    None => Ok(None),
                    Some(key) => tracker.issue(&team, &key).await.map(Some),
                }
            }
        })
        .await?;

        for (branch, issue) in branches.iter_mut().zip(issues) {
            branch.link_issue(issue);
        }
        Ok(())
    }

    /// Fetches per-branch commit detail for the surviving branches and merges
    /// the committer email into each record positionally.
    async fn enrich_details(&self, branches: &mut [Branch]) -> Result<(), QueryError> {
        if branches.is_empty() {
            return Ok(());
        }
        info!(
            org = %self.config.github_org.name(),
            branches = branches.len(),
            "retrieving detailed github branch info"
        );

        let workers = worker_count(self.config.thread_limit, branches.len(), 1);
        let github = self.github;
        let targets = branches.to_vec();
        let emails = ordered_map(targets, workers, |branch| async move {
            github.committer_email(&branch).await
        })
        .await?;

        for (branch, email) in branches.iter_mut().zip(emails) {
            branch.record_committer(email);
        }
        Ok(())
    }
}

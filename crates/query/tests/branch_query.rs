//! Pipeline tests driven by in-memory fakes of the two remote-API ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use query::{
    Branch, BranchQuery, Filter, FilterSpec, GitHubHost, Issue, IssueKey, IssueStatus,
    IssueTracker, OrgName, QueryConfig, QueryConfigSpec, QueryError, RawBranch, Repo,
    TransformSpec, ITEMS_PER_PAGE,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeGitHub {
    /// Repositories, split into listing pages of ITEMS_PER_PAGE.
    repos: Vec<Repo>,
    /// Branch entries per repository name.
    branches: HashMap<String, Vec<RawBranch>>,
    /// Committer email per branch name.
    emails: HashMap<String, String>,
    detail_calls: AtomicUsize,
}

impl FakeGitHub {
    fn with_repo(org: &str, repo: &str, branches: Vec<(&str, &str)>) -> Self {
        let mut fake = FakeGitHub::default();
        fake.add_repo(org, repo, branches);
        fake
    }

    fn add_repo(&mut self, org: &str, repo: &str, branches: Vec<(&str, &str)>) {
        self.repos.push(make_repo(org, repo));
        self.branches.insert(
            repo.to_string(),
            branches
                .into_iter()
                .map(|(name, commit_url)| RawBranch {
                    name: name.to_string(),
                    commit_url: commit_url.to_string(),
                })
                .collect(),
        );
    }

    fn with_email(mut self, branch: &str, email: &str) -> Self {
        self.emails.insert(branch.to_string(), email.to_string());
        self
    }
}

#[async_trait]
impl GitHubHost for FakeGitHub {
    async fn repository_count(&self, _org: &OrgName) -> Result<usize, QueryError> {
        Ok(self.repos.len())
    }

    async fn repository_page(&self, _org: &OrgName, page: usize) -> Result<Vec<Repo>, QueryError> {
        Ok(self
            .repos
            .chunks(ITEMS_PER_PAGE)
            .nth(page - 1)
            .map(<[Repo]>::to_vec)
            .unwrap_or_default())
    }

    async fn branch_entries(&self, repo: &Repo) -> Result<Vec<RawBranch>, QueryError> {
        Ok(self
            .branches
            .get(repo.name().as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn committer_email(&self, branch: &Branch) -> Result<String, QueryError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.emails
            .get(branch.name().as_str())
            .cloned()
            .ok_or_else(|| QueryError::MalformedResponse {
                url: format!("fake://branches/{}", branch.name()),
                detail: "missing commit.commit.author.email".to_string(),
            })
    }
}

#[derive(Default)]
struct FakeJira {
    issues: HashMap<String, IssueStatus>,
    calls: AtomicUsize,
}

impl FakeJira {
    fn with_issue(mut self, key: &str, status: IssueStatus) -> Self {
        self.issues.insert(key.to_string(), status);
        self
    }
}

#[async_trait]
impl IssueTracker for FakeJira {
    async fn issue(&self, _team: &str, key: &IssueKey) -> Result<Issue, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let status = self.issues.get(key.as_str()).copied().ok_or_else(|| {
            QueryError::MalformedResponse {
                url: format!("fake://issue/{key}"),
                detail: "no such issue".to_string(),
            }
        })?;
        Ok(Issue::new(key.clone(), status))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_repo(org: &str, repo: &str) -> Repo {
    use query::Organization;
    Repo::new(
        query::RepoName::new(repo).unwrap(),
        Organization::new(OrgName::new(org).unwrap()),
    )
}

fn commit_url(org: &str, repo: &str, sha: &str) -> String {
    format!("https://api.github.com/repos/{org}/{repo}/commits/{sha}")
}

fn config(org: &str) -> QueryConfig {
    QueryConfig::from_spec(QueryConfigSpec {
        data_type: "branch".to_string(),
        thread_limit: Some(4),
        github_org: org.to_string(),
        output_path: None,
    })
    .unwrap()
}

fn name_filter(precedence: u32, patterns: &[&str]) -> Filter {
    Filter::from_spec(FilterSpec::Name {
        precedence,
        regular_expressions: patterns.iter().map(|p| p.to_string()).collect(),
    })
    .unwrap()
}

fn issue_filter(precedence: u32, statuses: Option<Vec<&str>>) -> Filter {
    Filter::from_spec(FilterSpec::Issue {
        precedence,
        jira_team_name: "acme".to_string(),
        jira_statuses: statuses.map(|s| s.iter().map(|v| v.to_string()).collect()),
        transform: TransformSpec {
            base: r"CFY-*\d+".to_string(),
            if_doesnt_contain: "-".to_string(),
            replace_from: "CFY".to_string(),
            replace_to: "CFY-".to_string(),
        },
    })
    .unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn end_to_end_name_then_issue_filtering_with_enrichment() {
    let github = FakeGitHub::with_repo(
        "acme",
        "svc-a",
        vec![
            ("CFY-10-fix", &commit_url("acme", "svc-a", "aaa")),
            ("master", &commit_url("acme", "svc-a", "bbb")),
        ],
    )
    .with_email("CFY-10-fix", "dev@acme.example");
    let jira = FakeJira::default().with_issue("CFY-10", IssueStatus::Closed);

    let mut query = BranchQuery::new(config("acme"), &github, &jira);
    query.attach_filters(vec![
        name_filter(1, &["CFY"]),
        issue_filter(2, Some(vec!["Closed"])),
    ]);
    let report = query.query().await.unwrap();

    let branches = report.branches();
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].name().as_str(), "CFY-10-fix");
    assert_eq!(branches[0].committer_email(), Some("dev@acme.example"));
    assert_eq!(
        branches[0].jira_issue().map(|i| i.status()),
        Some(IssueStatus::Closed)
    );
    // "master" was narrowed out by the name filter before issue resolution.
    assert_eq!(jira.calls.load(Ordering::SeqCst), 1);
    // Detail enrichment only touches survivors.
    assert_eq!(github.detail_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn issue_resolution_runs_at_most_once_per_query() {
    let github = FakeGitHub::with_repo(
        "acme",
        "svc-a",
        vec![("CFY-10-fix", &commit_url("acme", "svc-a", "aaa"))],
    )
    .with_email("CFY-10-fix", "dev@acme.example");
    let jira = FakeJira::default().with_issue("CFY-10", IssueStatus::Resolved);

    let mut query = BranchQuery::new(config("acme"), &github, &jira);
    // Two issue filters in sequence: one batch fetch, not two.
    query.attach_filters(vec![
        issue_filter(1, Some(vec!["Resolved", "Closed"])),
        issue_filter(2, Some(vec!["Resolved"])),
    ]);
    let report = query.query().await.unwrap();

    assert_eq!(report.branches().len(), 1);
    assert_eq!(jira.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn issues_zip_back_positionally_and_absent_keys_stay_unlinked() {
    // Three branches; the middle one derives no key. Sorted order is
    // CFY-1-a, CFY-2-b, zz-no-key; the unkeyed branch must stay unlinked
    // while its neighbours get their own issues.
    let github = FakeGitHub::with_repo(
        "acme",
        "svc-a",
        vec![
            ("CFY-1-a", &commit_url("acme", "svc-a", "aaa")),
            ("zz-no-key", &commit_url("acme", "svc-a", "bbb")),
            ("CFY-2-b", &commit_url("acme", "svc-a", "ccc")),
        ],
    )
    .with_email("CFY-1-a", "one@acme.example")
    .with_email("CFY-2-b", "two@acme.example");
    let jira = FakeJira::default()
        .with_issue("CFY-1", IssueStatus::Open)
        .with_issue("CFY-2", IssueStatus::Closed);

    let mut query = BranchQuery::new(config("acme"), &github, &jira);
    // Full recognized status set: any linked issue is legal, unlinked is not.
    query.attach_filters(vec![issue_filter(1, None)]);
    let report = query.query().await.unwrap();

    let keys: Vec<_> = report
        .branches()
        .iter()
        .map(|b| {
            (
                b.name().as_str().to_string(),
                b.jira_issue().map(|i| i.key().as_str().to_string()),
            )
        })
        .collect();
    assert_eq!(
        keys,
        vec![
            ("CFY-1-a".to_string(), Some("CFY-1".to_string())),
            ("CFY-2-b".to_string(), Some("CFY-2".to_string())),
        ]
    );
    assert_eq!(jira.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn enumeration_is_sorted_by_name_and_deterministic() {
    let mut github = FakeGitHub::default();
    github.add_repo(
        "acme",
        "svc-b",
        vec![
            ("zulu", &commit_url("acme", "svc-b", "aaa")),
            ("alpha", &commit_url("acme", "svc-b", "bbb")),
        ],
    );
    github.add_repo(
        "acme",
        "svc-a",
        vec![
            ("Mike", &commit_url("acme", "svc-a", "ccc")),
            ("alpha", &commit_url("acme", "svc-a", "ddd")),
        ],
    );
    for name in ["zulu", "alpha", "Mike"] {
        github.emails.insert(
            name.to_string(),
            format!("{}@acme.example", name.to_lowercase()),
        );
    }
    let jira = FakeJira::default();

    let mut names = Vec::new();
    for _ in 0..2 {
        let query = BranchQuery::new(config("acme"), &github, &jira);
        let report = query.query().await.unwrap();
        names.push(
            report
                .branches()
                .iter()
                .map(|b| {
                    (
                        b.name().as_str().to_string(),
                        b.repo().name().as_str().to_string(),
                    )
                })
                .collect::<Vec<_>>(),
        );
    }

    // Case-sensitive name sort; the duplicate "alpha" keeps input order
    // (svc-b's listing was fetched first).
    let expected = vec![
        ("Mike".to_string(), "svc-a".to_string()),
        ("alpha".to_string(), "svc-b".to_string()),
        ("alpha".to_string(), "svc-a".to_string()),
        ("zulu".to_string(), "svc-b".to_string()),
    ];
    assert_eq!(names[0], expected);
    assert_eq!(names[1], expected);
}

#[tokio::test]
async fn commit_url_mismatch_aborts_the_query() {
    let github = FakeGitHub::with_repo(
        "acme",
        "svc-a",
        vec![("master", "https://example.com/not/a/commit")],
    );
    let jira = FakeJira::default();

    let result = BranchQuery::new(config("acme"), &github, &jira)
        .query()
        .await;
    assert!(matches!(result, Err(QueryError::CommitUrlPattern { .. })));
}

#[tokio::test]
async fn failed_issue_fetch_aborts_the_query() {
    let github = FakeGitHub::with_repo(
        "acme",
        "svc-a",
        vec![("CFY-7-fix", &commit_url("acme", "svc-a", "aaa"))],
    );
    // FakeJira knows no issues, so the keyed fetch fails.
    let jira = FakeJira::default();

    let mut query = BranchQuery::new(config("acme"), &github, &jira);
    query.attach_filters(vec![issue_filter(1, None)]);
    let result = query.query().await;
    assert!(matches!(result, Err(QueryError::MalformedResponse { .. })));
}

#[tokio::test]
async fn report_round_trips_through_the_output_file() {
    let github = FakeGitHub::with_repo(
        "acme",
        "svc-a",
        vec![("CFY-10-fix", &commit_url("acme", "svc-a", "aaa"))],
    )
    .with_email("CFY-10-fix", "dev@acme.example");
    let jira = FakeJira::default().with_issue("CFY-10", IssueStatus::Closed);

    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("out").join("report.json");
    let config = QueryConfig::from_spec(QueryConfigSpec {
        data_type: "branch".to_string(),
        thread_limit: None,
        github_org: "acme".to_string(),
        output_path: Some(output_path.clone()),
    })
    .unwrap();

    let mut query = BranchQuery::new(config, &github, &jira);
    query.attach_filters(vec![issue_filter(1, None)]);
    let report = query.query().await.unwrap();
    report.write().unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{
            "name": "CFY-10-fix",
            "repo": { "name": "svc-a", "organization": { "name": "acme" } },
            "jira_issue": { "key": "CFY-10", "status": "Closed" },
            "committer_email": "dev@acme.example",
        }])
    );
}

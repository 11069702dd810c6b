//! Filter specifications, compiled filters, and chain ordering.
//!
//! Filters arrive from configuration as a [`FilterSpec`] (a serde-tagged
//! enum over the `type` key) and are compiled once into a [`Filter`] at
//! construction time, where precedence, status names, and patterns are all
//! validated. The polymorphic "given candidates, return the legal subset"
//! operation is the [`Filter::admits`] predicate applied by the chain.

use regex::Regex;
use serde::Deserialize;

use crate::errors::QueryError;
use crate::transform::{Transform, TransformSpec};
use crate::types::{Branch, IssueStatus};

/// Precedence assigned to filters that do not configure one: they sort after
/// every explicitly ordered filter.
const UNSPECIFIED_PRECEDENCE: u32 = u32::MAX;

fn unspecified_precedence() -> u32 {
    UNSPECIFIED_PRECEDENCE
}

/// Configuration shape of a single filter entry in the YAML document.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterSpec {
    /// A syntactic filter over branch names.
    Name {
        /// Application order; lower runs first.
        #[serde(default = "unspecified_precedence")]
        precedence: u32,
        /// A branch is legal iff at least one of these matches its name.
        #[serde(default)]
        regular_expressions: Vec<String>,
    },
    /// A filter over the workflow status of each branch's linked issue.
    Issue {
        /// Application order; lower runs first.
        #[serde(default = "unspecified_precedence")]
        precedence: u32,
        /// The tracker subdomain (`https://{team}.atlassian.net`).
        jira_team_name: String,
        /// Allowed statuses. Absent means the full recognized set, so any
        /// linked issue is legal.
        #[serde(default)]
        jira_statuses: Option<Vec<String>>,
        /// The branch-name to issue-key derivation rule.
        transform: TransformSpec,
    },
}

/// A compiled filter, ready to be applied to a branch collection.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Name-pattern filter.
    Name(NameFilter),
    /// Linked-issue-status filter.
    Issue(IssueFilter),
}

impl Filter {
    /// Compiles and validates a configured filter.
    pub fn from_spec(spec: FilterSpec) -> Result<Self, QueryError> {
        match spec {
            FilterSpec::Name {
                precedence,
                regular_expressions,
            } => Ok(Filter::Name(NameFilter::new(
                validated_precedence(precedence)?,
                regular_expressions,
            )?)),
            FilterSpec::Issue {
                precedence,
                jira_team_name,
                jira_statuses,
                transform,
            } => {
                let statuses = match jira_statuses {
                    None => IssueStatus::ALL.to_vec(),
                    Some(names) => names
                        .iter()
                        .map(|name| name.parse::<IssueStatus>())
                        .collect::<Result<Vec<_>, _>>()?,
                };
                Ok(Filter::Issue(IssueFilter::new(
                    validated_precedence(precedence)?,
                    jira_team_name,
                    statuses,
                    Transform::from_spec(transform)?,
                )))
            }
        }
    }

    /// Returns the filter's application precedence.
    pub fn precedence(&self) -> u32 {
        match self {
            Filter::Name(f) => f.precedence,
            Filter::Issue(f) => f.precedence,
        }
    }

    /// Returns whether `branch` is legal under this filter.
    pub fn admits(&self, branch: &Branch) -> bool {
        match self {
            Filter::Name(f) => f.admits(branch),
            Filter::Issue(f) => f.admits(branch),
        }
    }
}

fn validated_precedence(value: u32) -> Result<u32, QueryError> {
    if value == 0 {
        return Err(QueryError::InvalidPrecedence { value });
    }
    Ok(value)
}

/// Legal iff the branch name matches at least one configured pattern.
///
/// Purely syntactic: never requires a side-fetch.
#[derive(Debug, Clone)]
pub struct NameFilter {
    precedence: u32,
    regexes: Vec<Regex>,
}

impl NameFilter {
    fn new(precedence: u32, patterns: Vec<String>) -> Result<Self, QueryError> {
        let regexes = patterns
            .into_iter()
            .map(|pattern| {
                Regex::new(&pattern).map_err(|source| QueryError::InvalidPattern {
                    pattern,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            precedence,
            regexes,
        })
    }

    fn admits(&self, branch: &Branch) -> bool {
        self.regexes
            .iter()
            .any(|regex| regex.is_match(branch.name().as_str()))
    }
}

/// Legal iff the branch has a linked issue whose status is in the allow-set.
///
/// A branch with no linked issue is always illegal under this filter; an
/// absent issue key during resolution is exclusion, not an error.
#[derive(Debug, Clone)]
pub struct IssueFilter {
    precedence: u32,
    jira_team_name: String,
    jira_statuses: Vec<IssueStatus>,
    transform: Transform,
}

impl IssueFilter {
    fn new(
        precedence: u32,
        jira_team_name: String,
        jira_statuses: Vec<IssueStatus>,
        transform: Transform,
    ) -> Self {
        Self {
            precedence,
            jira_team_name,
            jira_statuses,
            transform,
        }
    }

    /// Returns the tracker subdomain issues are fetched from.
    pub fn jira_team_name(&self) -> &str {
        &self.jira_team_name
    }

    /// Returns the issue-key derivation rule.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    fn admits(&self, branch: &Branch) -> bool {
        match branch.jira_issue() {
            None => false,
            Some(issue) => self.jira_statuses.contains(&issue.status()),
        }
    }
}

/// Orders filters for chain application: precedence ascending, ties keeping
/// their relative configuration order (`sort_by_key` is stable).
pub fn order_by_precedence(mut filters: Vec<Filter>) -> Vec<Filter> {
    filters.sort_by_key(Filter::precedence);
    filters
}

//! Core query domain for Tattle.
//!
//! This crate contains every domain concept used to enumerate an
//! organization's branches, thread them through a precedence-ordered filter
//! chain, and enrich the survivors with committer information. Infrastructure
//! crates implement the port traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no HTTP dependencies.
//! It defines *what* data is needed from GitHub and the issue tracker; the
//! `github` and `jira` crates define *how* to fetch it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype domain identifiers (`OrgName`, `IssueKey`, etc.) |
//! | [`types`] | Entities (`Organization`, `Repo`, `Branch`, `Issue`) |
//! | [`errors`] | The crate-wide [`QueryError`] type |
//! | [`transform`] | Branch-name to issue-key derivation rule |
//! | [`filters`] | Filter specifications, compiled filters, chain ordering |
//! | [`fanout`] | Worker-count policy and the ordered concurrent batch map |
//! | [`ports`] | Async traits implemented by the remote-API adapters |
//! | [`query`] | Query configuration and the branch-query pipeline |
//! | [`report`] | Serialization of the final branch collection |

pub mod errors;
pub mod fanout;
pub mod filters;
pub mod identifiers;
pub mod ports;
pub mod query;
pub mod report;
pub mod transform;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::QueryError;
pub use fanout::{ordered_map, worker_count, NO_WORKER_LIMIT};
pub use filters::{Filter, FilterSpec, IssueFilter, NameFilter};
pub use identifiers::{BranchName, IssueKey, OrgName, QueryRunId, RepoName};
pub use ports::{GitHubHost, IssueTracker};
pub use query::{BranchQuery, DataType, QueryConfig, QueryConfigSpec, ITEMS_PER_PAGE};
pub use report::QueryReport;
pub use transform::{Transform, TransformSpec};
pub use types::{Branch, Issue, IssueStatus, Organization, RawBranch, Repo};

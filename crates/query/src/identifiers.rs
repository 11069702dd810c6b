//! Newtype domain identifiers.
//!
//! Every name that travels between components is a distinct newtype wrapping
//! a `String`. This prevents accidentally interchanging — for example — a
//! [`RepoName`] with a [`BranchName`] even though both are strings under the
//! hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// The login name of a GitHub organization (e.g. `"cloudify-cosmo"`).
    OrgName
}

string_id! {
    /// The name of a repository within an organization.
    RepoName
}

string_id! {
    /// A Git branch name (e.g. `"master"`, `"CFY-3223-allow-external-rabbitmq"`).
    ///
    /// Branch enumeration sorts by this value: lexicographic, case-sensitive,
    /// which is exactly the derived `Ord` on the wrapped string.
    BranchName
}

string_id! {
    /// A canonical issue-tracker key (e.g. `"CFY-3223"`), as produced by a
    /// [`crate::Transform`] from a branch name.
    IssueKey
}

/// Identifies a single query execution run.
///
/// Generated fresh for every CLI invocation; carried in the root tracing span
/// so all events from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryRunId(Uuid);

impl QueryRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for QueryRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

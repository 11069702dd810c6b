//! The crate-wide error type.
//!
//! Every fatal condition aborts the run: a single failed page fetch, a
//! malformed payload, or an invalid configuration all propagate out of the
//! pipeline unmodified. There is no retry and no partial report. The one
//! non-error in the neighbourhood — a branch name that yields no issue key —
//! is modelled as an absent key, not as a variant here.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error source for wrapped transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while loading configuration, fetching remote data, or
/// emitting the report.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The configuration document is missing a required field or carries a
    /// value that fails validation.
    ///
    /// Produced at load time; the query never starts with an invalid config.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A remote call failed: network error or a non-2xx status.
    #[error("GET {url} failed")]
    Fetch {
        /// The URL that was being fetched.
        url: String,
        /// The underlying transport error.
        #[source]
        source: BoxError,
    },

    /// A remote response parsed as JSON but did not have the expected shape.
    ///
    /// Raised at the point of access so corrupt data is never silently
    /// propagated into the report.
    #[error("unexpected payload from {url}: {detail}")]
    MalformedResponse {
        /// The URL whose response was malformed.
        url: String,
        /// What was missing or wrong.
        detail: String,
    },

    /// A branch entry's embedded commit URL did not match the GitHub commits
    /// pattern, so the owning repository cannot be derived.
    #[error("commit url `{url}` does not match the GitHub commits pattern")]
    CommitUrlPattern {
        /// The offending commit URL.
        url: String,
    },

    /// A filter was configured with a non-positive precedence.
    #[error("filter precedence must be a positive integer, got {value}")]
    InvalidPrecedence {
        /// The rejected precedence value.
        value: u32,
    },

    /// An issue status string is not a member of the recognized status set.
    ///
    /// Produced both for configured allow-lists and for statuses parsed out
    /// of issue-tracker responses.
    #[error("unrecognized issue status `{value}`")]
    UnknownStatus {
        /// The rejected status string.
        value: String,
    },

    /// The configured `data_type` names a query kind that is not implemented.
    #[error("unsupported data type `{value}`; only `branch` queries are supported")]
    UnsupportedDataType {
        /// The rejected data type.
        value: String,
    },

    /// A configured regular expression failed to compile.
    #[error("invalid pattern `{pattern}`")]
    InvalidPattern {
        /// The pattern source text.
        pattern: String,
        /// The compile error.
        #[source]
        source: regex::Error,
    },

    /// The report file could not be written.
    #[error("failed to write report to {path}")]
    Report {
        /// The destination path.
        path: PathBuf,
        /// The underlying write or serialization error.
        #[source]
        source: BoxError,
    },
}

impl QueryError {
    /// Convenience constructor for [`QueryError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

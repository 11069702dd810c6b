//! Serialization of the final branch collection.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::QueryError;
use crate::types::Branch;

/// The assembled result of one query: the enriched branch collection and its
/// destination.
///
/// No partial report is ever written; a [`QueryReport`] only exists once the
/// whole pipeline has completed.
#[derive(Debug)]
pub struct QueryReport {
    branches: Vec<Branch>,
    output_path: PathBuf,
}

impl QueryReport {
    pub(crate) fn new(branches: Vec<Branch>, output_path: PathBuf) -> Self {
        Self {
            branches,
            output_path,
        }
    }

    /// The enriched branches, in filter-chain output order.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    /// The configured destination path.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Writes the branch collection as JSON to the destination, creating
    /// parent directories as needed.
    pub fn write(&self) -> Result<(), QueryError> {
        if let Some(parent) = self.output_path.parent() {
            fs::create_dir_all(parent).map_err(|source| QueryError::Report {
                path: self.output_path.clone(),
                source: source.into(),
            })?;
        }
        let file = fs::File::create(&self.output_path).map_err(|source| QueryError::Report {
            path: self.output_path.clone(),
            source: source.into(),
        })?;
        serde_json::to_writer_pretty(file, &self.branches).map_err(|source| QueryError::Report {
            path: self.output_path.clone(),
            source: source.into(),
        })
    }
}

//! The YAML configuration document.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use query::{FilterSpec, QueryConfigSpec};

/// Top-level shape of the configuration file: one `query_config` mapping and
/// a list of filter entries.
#[derive(Debug, Deserialize)]
pub struct ConfigDocument {
    /// The query configuration section.
    pub query_config: QueryConfigSpec,
    /// Filter specifications, in configuration order.
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

impl ConfigDocument {
    /// Loads and parses the document at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!(
                "The config path you provided, `{}`, does not lead to a readable file.",
                path.display()
            )
        })?;
        serde_yml::from_str(&contents)
            .with_context(|| format!("failed to parse `{}`", path.display()))
    }
}

//! Tattle CLI entry point.
//!
//! This binary is the composition root for the whole tool. Responsibilities:
//!
//! 1. **Parse arguments** — one required flag, the YAML config path.
//! 2. **Enforce credentials** — `GITHUB_USER` / `GITHUB_PASS` must be present
//!    and non-empty before any network activity.
//! 3. **Wire observability** — configure `tracing-subscriber` and open a root
//!    span carrying a fresh [`query::QueryRunId`] so all events from one run
//!    can be correlated.
//! 4. **Construct infrastructure** — build the `GithubClient` and
//!    `JiraClient` adapters and inject them into the [`query::BranchQuery`]
//!    pipeline.
//! 5. **Run** — execute the query, write the report, log the elapsed time.

mod config;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, Instrument};
use tracing_subscriber::EnvFilter;

use config::ConfigDocument;
use github::{Credentials, GithubClient};
use jira::JiraClient;
use query::{BranchQuery, Filter, QueryConfig, QueryRunId};

const GITHUB_USER: &str = "GITHUB_USER";
const GITHUB_PASS: &str = "GITHUB_PASS";

/// Perform simple queries on your GitHub branches
#[derive(Debug, Parser)]
#[command(name = "tattle")]
struct Args {
    /// a path to a YAML configuration file
    #[arg(short = 'c', long = "config-path", value_name = "CONFIG_FILE")]
    config_path: PathBuf,
}

fn github_credentials() -> Result<Credentials> {
    let user = std::env::var(GITHUB_USER).unwrap_or_default();
    let pass = std::env::var(GITHUB_PASS).unwrap_or_default();
    if user.is_empty() || pass.is_empty() {
        bail!(
            "GitHub authentication environment variables do not exist.\n\
             Please define them: [{GITHUB_USER}], [{GITHUB_PASS}], and try again."
        );
    }
    Ok(Credentials::new(user, pass))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let start = Instant::now();
    let args = Args::parse();
    let credentials = github_credentials()?;

    let document = ConfigDocument::load(&args.config_path)?;
    let config = QueryConfig::from_spec(document.query_config)?;
    let filters = document
        .filters
        .into_iter()
        .map(Filter::from_spec)
        .collect::<Result<Vec<_>, _>>()?;

    let run_id = QueryRunId::new_random();
    let span = tracing::info_span!("query_run", %run_id, org = %config.github_org.name());

    let github = GithubClient::new(credentials);
    let tracker = JiraClient::new();

    let report = async {
        let mut branch_query = BranchQuery::new(config, &github, &tracker);
        branch_query.attach_filters(filters);
        branch_query.query().await
    }
    .instrument(span)
    .await?;
    report.write()?;

    info!(
        path = %report.output_path().display(),
        branches = report.branches().len(),
        "report written"
    );
    println!("total time: {:.3} seconds", start.elapsed().as_secs_f64());
    Ok(())
}

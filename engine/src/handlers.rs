//! Command handlers
//!
//! Wires the pipeline together: fetch snapshots, diff, check policy, decide,
//! execute. Handlers return the process exit code; the binary turns a
//! non-zero code into a non-zero exit so the hosting CI fails the check.

use std::path::Path;

use anyhow::Context;
use sdk::types::Registry;
use tracing::info;

use crate::config::{Config, Credentials};
use crate::diff;
use crate::github::GithubClient;
use crate::policy::{self, PrContext};
use crate::workflow;

/// Run the full remote review workflow for one pull request
pub async fn handle_review(
    config: &Config,
    credentials: Credentials,
    pr_override: Option<u64>,
    dry_run: bool,
) -> anyhow::Result<i32> {
    config.validate_for_review()?;
    let pr_number = pr_override.unwrap_or(credentials.pr_number);
    let client = GithubClient::new(config, credentials.token)?;

    let original = client.fetch_registry(&config.registry.path).await?;
    info!(plugins = original.len(), "fetched original registry");

    let proposed_path = config.proposed_registry_path();
    let proposed_text = tokio::fs::read_to_string(&proposed_path)
        .await
        .with_context(|| format!("cannot read {}", proposed_path.display()))?;
    let proposed = Registry::parse(&proposed_text)?;
    info!(plugins = proposed.len(), "read proposed registry");

    let modifications = diff::diff(&original, &proposed);
    info!(count = modifications.len(), "detected modifications");

    let pr = client.pull_request(pr_number).await?;
    let changed_files = client.changed_files(pr_number).await?;
    info!(
        pr = pr.number,
        author = %pr.user.login,
        association = ?pr.author_association,
        files = changed_files.len(),
        "loaded pull request"
    );

    let problems = policy::check(
        &modifications,
        &original,
        &proposed,
        &proposed_text,
        &PrContext {
            author: &pr.user.login,
            changed_files: &changed_files,
            registry_path: &config.registry.path,
        },
    )?;
    info!(count = problems.len(), "policy check complete");
    for problem in &problems {
        info!(path = %problem.path, line = ?problem.line, "{}", problem.body);
    }

    let action = workflow::decide(&problems, pr.author_association, &config.review);

    if dry_run {
        info!(verdict = ?action.verdict, merge = action.merge, "dry run, not submitting");
        return Ok(action.exit_code);
    }

    let state = workflow::execute(&client, pr_number, &config.github.bot_login, &action).await?;
    info!(?state, "review submitted");

    Ok(action.exit_code)
}

/// Diff and validate two local registry files without touching the network.
///
/// The changed-file list is taken to be just the registry document, so only
/// the plugin-count, ownership, and required-field rules can fire.
pub async fn handle_check(
    config: &Config,
    original_path: &Path,
    proposed_path: &Path,
    author: &str,
) -> anyhow::Result<i32> {
    let original_text = tokio::fs::read_to_string(original_path)
        .await
        .with_context(|| format!("cannot read {}", original_path.display()))?;
    let proposed_text = tokio::fs::read_to_string(proposed_path)
        .await
        .with_context(|| format!("cannot read {}", proposed_path.display()))?;

    let original = Registry::parse(&original_text)?;
    let proposed = Registry::parse(&proposed_text)?;

    let modifications = diff::diff(&original, &proposed);
    info!(count = modifications.len(), "detected modifications");

    let changed_files = vec![config.registry.path.clone()];
    let problems = policy::check(
        &modifications,
        &original,
        &proposed,
        &proposed_text,
        &PrContext {
            author,
            changed_files: &changed_files,
            registry_path: &config.registry.path,
        },
    )?;

    if problems.is_empty() {
        println!("all checks passed");
        return Ok(0);
    }

    for problem in &problems {
        match problem.line {
            Some(line) => println!("{}:{line}: {}", problem.path, problem.body),
            None => println!("{}: {}", problem.path, problem.body),
        }
    }
    println!("{} problem(s) found", problems.len());

    Ok(1)
}

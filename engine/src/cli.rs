//! CLI interface for the review bot
//!
//! Defines the commands and global flags using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Automated reviewer for plugin-registry pull requests
///
/// Diffs the proposed registry against the last-committed one, applies the
/// submission rules, and drives the code-review workflow accordingly.
#[derive(Parser, Debug)]
#[command(name = "reviewbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Review the pull request named by PR_NUMBER and submit the result
    Review {
        /// Pull request number (overrides the PR_NUMBER environment variable)
        #[arg(long)]
        pr: Option<u64>,

        /// Compute and log the decision without submitting anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a proposed registry against a prior snapshot, locally
    Check {
        /// Path to the prior registry document
        #[arg(long, value_name = "PATH")]
        original: PathBuf,

        /// Path to the proposed registry document
        #[arg(long, value_name = "PATH")]
        proposed: PathBuf,

        /// Submitter login used for the ownership rule
        #[arg(long)]
        author: String,
    },
}

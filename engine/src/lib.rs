//! Reviewbot Engine Library
//!
//! Automated reviewer for pull requests against a community-maintained
//! plugin registry. The core is pure: a source locator mapping JSON key
//! paths to text spans, a diff engine over two registry snapshots, and a
//! policy engine turning the diff into reviewable problems. Everything else
//! is thin I/O glue around it.

/// CLI interface module
pub mod cli;

/// Configuration management module
pub mod config;

/// Diff engine for registry snapshots
pub mod diff;

/// Code-review platform client
pub mod github;

/// Command handlers module
pub mod handlers;

/// Source locator for registry documents
pub mod locator;

/// Policy engine for registry pull requests
pub mod policy;

/// Telemetry and observability
pub mod telemetry;

/// Review workflow state machine
pub mod workflow;

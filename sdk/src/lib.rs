//! Reviewbot SDK
//!
//! Shared library providing the registry data model and error types used by
//! the review engine and its tests.

/// Error types and handling
pub mod errors;

/// Registry, modification, and problem types
pub mod types;

// Re-export commonly used types
pub use errors::BotError;
pub use types::{
    AuthorAssociation, Modification, Plugin, Problem, Registry, Release, ReleaseChannels, Urls,
};

//! Error types and handling
//!
//! This module provides the error type used throughout the review engine.
//! Remote failures and malformed registry documents are fatal to a run; the
//! caller's only recourse is a non-zero exit, so every variant carries enough
//! context to log and bail.

use thiserror::Error;

/// Main bot error type
#[derive(Debug, Error)]
pub enum BotError {
    /// Malformed JSON in either registry snapshot
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON text that could not be scanned for key locations
    #[error("malformed JSON at line {line}, column {column}: {message}")]
    Parse {
        line: u64,
        column: u64,
        message: String,
    },

    /// Network-level failure talking to the review platform
    #[error("network error: {0}")]
    Http(String),

    /// Non-success response from the review platform
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Required environment variable absent or unreadable
    #[error("missing environment variable: {0}")]
    MissingEnv(String),

    /// Payload that could not be decoded (base64, UTF-8)
    #[error("decode error: {0}")]
    Decode(String),
}

/// Convenience alias used by the engine modules
pub type Result<T> = std::result::Result<T, BotError>;

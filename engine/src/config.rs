//! Configuration management
//!
//! All repository coordinates and review policy live in an explicit
//! [`Config`] passed into the collaborators at startup; there are no
//! ambient globals. Configuration is read from an optional `reviewbot.toml`
//! in the working copy, with sensible defaults for every field. Credentials
//! (API token, PR number) come from the process environment, the way the
//! hosting CI supplies them.

use std::path::Path;

use sdk::errors::BotError;
use serde::{Deserialize, Serialize};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "reviewbot.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Review platform coordinates
    #[serde(default)]
    pub github: GithubConfig,

    /// Registry document settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Review policy knobs
    #[serde(default)]
    pub review: ReviewPolicy,
}

/// Review platform coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Repository owner (organization or user)
    #[serde(default)]
    pub owner: String,

    /// Repository name
    #[serde(default)]
    pub repo: String,

    /// API base URL; overridable for tests
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Login the bot's own reviews are submitted under
    #[serde(default = "default_bot_login")]
    pub bot_login: String,
}

/// Registry document settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Repository-relative path of the registry document
    #[serde(default = "default_registry_path")]
    pub path: String,

    /// Root of the PR checkout holding the proposed document.
    /// Defaults to the current working directory.
    #[serde(default)]
    pub checkout: Option<std::path::PathBuf>,
}

/// Review policy knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPolicy {
    /// Squash-merge clean PRs from repeat contributors
    #[serde(default = "default_true")]
    pub auto_merge: bool,

    /// Dismiss stale bot reviews before resubmitting
    #[serde(default = "default_true")]
    pub dismiss_stale: bool,

    /// Human reviewer to request on clean first-time contributions
    #[serde(default)]
    pub reviewer: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            api_base: default_api_base(),
            bot_login: default_bot_login(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: default_registry_path(),
            checkout: None,
        }
    }
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            auto_merge: true,
            dismiss_stale: true,
            reviewer: None,
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_bot_login() -> String {
    "github-actions[bot]".to_string()
}

fn default_registry_path() -> String {
    "registry.json".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from an explicit file path
    pub fn load_from_path(path: &Path) -> Result<Self, BotError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            BotError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&contents)
            .map_err(|e| BotError::Config(format!("invalid {}: {e}", path.display())))
    }

    /// Load `reviewbot.toml` from the working directory when present,
    /// defaults otherwise
    pub fn load_or_default() -> Result<Self, BotError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Ensure the repository coordinates needed for remote review are set
    pub fn validate_for_review(&self) -> Result<(), BotError> {
        if self.github.owner.is_empty() || self.github.repo.is_empty() {
            return Err(BotError::Config(
                "github.owner and github.repo must be configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Filesystem path of the proposed registry in the PR checkout
    pub fn proposed_registry_path(&self) -> std::path::PathBuf {
        match &self.registry.checkout {
            Some(checkout) => checkout.join(&self.registry.path),
            None => std::path::PathBuf::from(&self.registry.path),
        }
    }
}

/// Credentials supplied by the hosting CI environment
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Review platform API token
    pub token: String,

    /// Pull request under review
    pub pr_number: u64,
}

impl Credentials {
    /// Read `GITHUB_TOKEN` and `PR_NUMBER` from the environment
    pub fn from_env() -> Result<Self, BotError> {
        let token = std::env::var("GITHUB_TOKEN")
            .map_err(|_| BotError::MissingEnv("GITHUB_TOKEN".to_string()))?;
        let pr_number = std::env::var("PR_NUMBER")
            .map_err(|_| BotError::MissingEnv("PR_NUMBER".to_string()))?
            .parse()
            .map_err(|_| BotError::Config("PR_NUMBER must be an integer".to_string()))?;
        Ok(Self { token, pr_number })
    }
}

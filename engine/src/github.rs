//! Code-review platform client
//!
//! Thin reqwest wrapper around the handful of GitHub REST calls the bot
//! needs: fetching the last-committed registry document, reading PR
//! metadata, and submitting review actions. The base URL is injectable so
//! tests can point the client at a mock server.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sdk::errors::BotError;
use sdk::types::{AuthorAssociation, Problem, Registry};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::Config;
use crate::workflow::Verdict;

const USER_AGENT: &str = concat!("reviewbot/", env!("CARGO_PKG_VERSION"));

/// An account on the review platform
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
}

/// The slice of pull-request metadata the bot consumes
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub user: Account,
    pub author_association: AuthorAssociation,
}

/// One previously submitted review
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub id: u64,
    pub user: Account,
    pub state: String,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    encoding: String,
}

#[derive(Debug, Deserialize)]
struct ChangedFile {
    filename: String,
}

/// Client for one repository on the review platform
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GithubClient {
    pub fn new(config: &Config, token: impl Into<String>) -> Result<Self, BotError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BotError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.github.api_base.trim_end_matches('/').to_string(),
            owner: config.github.owner.clone(),
            repo: config.github.repo.clone(),
            token: token.into(),
        })
    }

    fn url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_url, self.owner, self.repo, tail
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, BotError> {
        debug!(url, "GET");
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| BotError::Http(e.to_string()))?;
        Self::decode(response).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        payload: serde_json::Value,
    ) -> Result<T, BotError> {
        let response = request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| BotError::Http(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BotError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BotError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| BotError::Http(e.to_string()))
    }

    /// Fetch the last-committed registry document from the default branch
    pub async fn fetch_registry(&self, path: &str) -> Result<Registry, BotError> {
        let contents: ContentsResponse = self.get_json(&self.url(&format!("contents/{path}"))).await?;

        if contents.encoding != "base64" {
            return Err(BotError::Decode(format!(
                "unexpected content encoding: {}",
                contents.encoding
            )));
        }

        // The contents API wraps base64 payloads across lines.
        let packed: String = contents
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(packed)
            .map_err(|e| BotError::Decode(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| BotError::Decode(e.to_string()))?;

        Registry::parse(&text)
    }

    /// Fetch the PR's submitter and author association
    pub async fn pull_request(&self, pr_number: u64) -> Result<PullRequest, BotError> {
        self.get_json(&self.url(&format!("pulls/{pr_number}"))).await
    }

    /// Paths of every file the PR changes
    pub async fn changed_files(&self, pr_number: u64) -> Result<Vec<String>, BotError> {
        let files: Vec<ChangedFile> = self
            .get_json(&self.url(&format!("pulls/{pr_number}/files?per_page=100")))
            .await?;
        Ok(files.into_iter().map(|f| f.filename).collect())
    }

    /// Previously submitted reviews on the PR
    pub async fn reviews(&self, pr_number: u64) -> Result<Vec<Review>, BotError> {
        self.get_json(&self.url(&format!("pulls/{pr_number}/reviews")))
            .await
    }

    /// Submit a review with one inline comment per problem
    pub async fn create_review(
        &self,
        pr_number: u64,
        verdict: Verdict,
        body: &str,
        comments: &[Problem],
    ) -> Result<(), BotError> {
        let url = self.url(&format!("pulls/{pr_number}/reviews"));
        let _: serde_json::Value = self
            .send_json(
                self.http.post(&url),
                json!({
                    "event": verdict,
                    "body": body,
                    "comments": comments,
                }),
            )
            .await?;
        Ok(())
    }

    /// Dismiss a previously submitted review
    pub async fn dismiss_review(
        &self,
        pr_number: u64,
        review_id: u64,
        message: &str,
    ) -> Result<(), BotError> {
        let url = self.url(&format!("pulls/{pr_number}/reviews/{review_id}/dismissals"));
        let _: serde_json::Value = self
            .send_json(self.http.put(&url), json!({ "message": message }))
            .await?;
        Ok(())
    }

    /// Request named human reviewers on the PR
    pub async fn request_reviewers(
        &self,
        pr_number: u64,
        reviewers: &[String],
    ) -> Result<(), BotError> {
        let url = self.url(&format!("pulls/{pr_number}/requested_reviewers"));
        let _: serde_json::Value = self
            .send_json(self.http.post(&url), json!({ "reviewers": reviewers }))
            .await?;
        Ok(())
    }

    /// Squash-merge the PR
    pub async fn merge(&self, pr_number: u64) -> Result<(), BotError> {
        let url = self.url(&format!("pulls/{pr_number}/merge"));
        let _: serde_json::Value = self
            .send_json(self.http.put(&url), json!({ "merge_method": "squash" }))
            .await?;
        Ok(())
    }
}

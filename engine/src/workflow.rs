//! Review workflow state machine
//!
//! One parameterized workflow replaces the registry's historical pile of
//! near-identical entry-point scripts. The decision of what to do with a
//! problem list is a pure function over the PR context and the configured
//! policy; executing that decision against the review platform is kept
//! separate so the decision logic stays trivially testable.

use sdk::errors::BotError;
use sdk::types::{AuthorAssociation, Problem};
use serde::Serialize;
use tracing::info;

use crate::config::ReviewPolicy;
use crate::github::GithubClient;

/// Where a pull request stands in the review workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Pending,
    ChangesRequested,
    Approved,
    Merged,
}

/// Review verdict, serialized as the platform's event string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Approve,
    RequestChanges,
    Comment,
}

/// Everything the executor needs to carry out one review decision
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub verdict: Verdict,
    pub body: String,
    /// Inline comments, one per problem
    pub comments: Vec<Problem>,
    /// Dismiss stale bot reviews before submitting
    pub dismiss_stale: bool,
    /// Squash-merge after approving
    pub merge: bool,
    /// Human reviewer to pull in, if any
    pub request_reviewer: Option<String>,
    /// Process exit code: 0 iff no problems
    pub exit_code: i32,
}

/// Decide what to do with a problem list. Pure.
///
/// No problems: approve; repeat contributors are auto-merged when the policy
/// allows it, first-timers get the configured human reviewer instead.
/// Any problems: request changes with one inline comment per problem.
pub fn decide(
    problems: &[Problem],
    association: AuthorAssociation,
    policy: &ReviewPolicy,
) -> Action {
    if problems.is_empty() {
        let first_time = association.is_first_time();
        return Action {
            verdict: Verdict::Approve,
            body: "✨ all checks passed".to_string(),
            comments: Vec::new(),
            dismiss_stale: policy.dismiss_stale,
            merge: policy.auto_merge && !first_time,
            request_reviewer: if first_time {
                policy.reviewer.clone()
            } else {
                None
            },
            exit_code: 0,
        };
    }

    let plural = if problems.len() == 1 { "" } else { "s" };
    Action {
        verdict: Verdict::RequestChanges,
        body: format!("🚫 {} problem{plural} encountered", problems.len()),
        comments: problems.to_vec(),
        dismiss_stale: policy.dismiss_stale,
        merge: false,
        request_reviewer: None,
        exit_code: 1,
    }
}

/// The state a pending PR lands in once `action` has been executed
pub fn resulting_state(action: &Action) -> ReviewState {
    match action.verdict {
        Verdict::RequestChanges => ReviewState::ChangesRequested,
        Verdict::Approve if action.merge => ReviewState::Merged,
        Verdict::Approve => ReviewState::Approved,
        Verdict::Comment => ReviewState::Pending,
    }
}

/// Execute a review decision against the platform.
///
/// Remote failures are fatal to the run; there is no retry.
pub async fn execute(
    client: &GithubClient,
    pr_number: u64,
    bot_login: &str,
    action: &Action,
) -> Result<ReviewState, BotError> {
    if action.dismiss_stale {
        for review in client.reviews(pr_number).await? {
            if review.state == "CHANGES_REQUESTED" && review.user.login == bot_login {
                info!(review_id = review.id, "dismissing stale bot review");
                client
                    .dismiss_review(pr_number, review.id, "Superseded by a newer automated review")
                    .await?;
            }
        }
    }

    client
        .create_review(pr_number, action.verdict, &action.body, &action.comments)
        .await?;

    if let Some(reviewer) = &action.request_reviewer {
        info!(reviewer, "requesting human review");
        client
            .request_reviewers(pr_number, std::slice::from_ref(reviewer))
            .await?;
    }

    if action.merge {
        info!(pr_number, "auto-merging");
        client.merge(pr_number).await?;
    }

    Ok(resulting_state(action))
}

//! Integration tests for the full review pipeline
//!
//! Runs `handle_review` against a mocked review platform: the contents API
//! serves the last-committed registry, the PR endpoints serve metadata, and
//! the tests assert on which review actions get submitted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reviewbot_engine::config::{Config, Credentials};
use reviewbot_engine::handlers;

const OWNER: &str = "example";
const REPO: &str = "plugins";
const PR: u64 = 7;

fn plugin_json(name: &str, authors: &[&str]) -> serde_json::Value {
    json!({
        "name": name,
        "authors": authors,
        "description": "Description",
        "isDeprecated": false,
        "categories": ["Category"],
        "keywords": ["Keyword"],
        "urls": {
            "repository": "https://github.com",
            "readme": "https://github.com"
        },
        "release": {
            "stable": {
                "signature": "signature",
                "version": "1.0.0",
                "url": "https://github.com"
            }
        }
    })
}

fn repo_path(tail: &str) -> String {
    format!("/repos/{OWNER}/{REPO}/{tail}")
}

/// Mount the read-side mocks every run needs
async fn mount_read_mocks(
    server: &MockServer,
    original: &serde_json::Value,
    association: &str,
    changed_files: &[&str],
) {
    let original_text = serde_json::to_string_pretty(original).expect("serializable");

    Mock::given(method("GET"))
        .and(path(repo_path("contents/registry.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": STANDARD.encode(original_text),
            "encoding": "base64",
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(repo_path(&format!("pulls/{PR}"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "number": PR,
            "user": { "login": "Author" },
            "author_association": association,
        })))
        .mount(server)
        .await;

    let files: Vec<serde_json::Value> = changed_files
        .iter()
        .map(|f| json!({ "filename": f }))
        .collect();
    Mock::given(method("GET"))
        .and(path(repo_path(&format!("pulls/{PR}/files"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(files))
        .mount(server)
        .await;
}

/// Config pointed at the mock server, with the proposed registry written
/// into a temporary checkout
fn config_for(server: &MockServer, checkout: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.github.owner = OWNER.to_string();
    config.github.repo = REPO.to_string();
    config.github.api_base = server.uri();
    config.registry.checkout = Some(checkout.path().to_path_buf());
    config
}

fn write_proposed(checkout: &tempfile::TempDir, proposed: &serde_json::Value) {
    let text = serde_json::to_string_pretty(proposed).expect("serializable");
    std::fs::write(checkout.path().join("registry.json"), text).expect("writable tempdir");
}

fn credentials() -> Credentials {
    Credentials {
        token: "test-token".to_string(),
        pr_number: PR,
    }
}

#[tokio::test]
async fn clean_pr_from_repeat_contributor_is_approved_and_merged() {
    let server = MockServer::start().await;
    let original = json!({ "a": plugin_json("New Plugin", &["Author"]) });
    let proposed = json!({ "a": plugin_json("Renamed Plugin", &["Author"]) });

    mount_read_mocks(&server, &original, "CONTRIBUTOR", &["registry.json"]).await;

    Mock::given(method("GET"))
        .and(path(repo_path(&format!("pulls/{PR}/reviews"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(repo_path(&format!("pulls/{PR}/reviews"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(repo_path(&format!("pulls/{PR}/merge"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "merged": true })))
        .expect(1)
        .mount(&server)
        .await;

    let checkout = tempfile::tempdir().expect("tempdir");
    write_proposed(&checkout, &proposed);
    let config = config_for(&server, &checkout);

    let exit_code = handlers::handle_review(&config, credentials(), None, false)
        .await
        .expect("review succeeds");
    assert_eq!(exit_code, 0);
}

#[tokio::test]
async fn unowned_change_requests_changes_and_never_merges() {
    let server = MockServer::start().await;
    // The registry record is owned by someone other than the submitter.
    let original = json!({ "a": plugin_json("New Plugin", &["Other"]) });
    let proposed = json!({ "a": plugin_json("Renamed Plugin", &["Other"]) });

    mount_read_mocks(&server, &original, "CONTRIBUTOR", &["registry.json"]).await;

    Mock::given(method("GET"))
        .and(path(repo_path(&format!("pulls/{PR}/reviews"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(repo_path(&format!("pulls/{PR}/reviews"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(repo_path(&format!("pulls/{PR}/merge"))))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let checkout = tempfile::tempdir().expect("tempdir");
    write_proposed(&checkout, &proposed);
    let config = config_for(&server, &checkout);

    let exit_code = handlers::handle_review(&config, credentials(), None, false)
        .await
        .expect("review succeeds");
    assert_eq!(exit_code, 1);
}

#[tokio::test]
async fn clean_pr_from_first_timer_requests_a_human_reviewer() {
    let server = MockServer::start().await;
    let original = json!({});
    let proposed = json!({ "a": plugin_json("New Plugin", &["Author"]) });

    mount_read_mocks(
        &server,
        &original,
        "FIRST_TIME_CONTRIBUTOR",
        &["registry.json"],
    )
    .await;

    Mock::given(method("GET"))
        .and(path(repo_path(&format!("pulls/{PR}/reviews"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(repo_path(&format!("pulls/{PR}/reviews"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(repo_path(&format!("pulls/{PR}/requested_reviewers"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(repo_path(&format!("pulls/{PR}/merge"))))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let checkout = tempfile::tempdir().expect("tempdir");
    write_proposed(&checkout, &proposed);
    let mut config = config_for(&server, &checkout);
    config.review.reviewer = Some("maintainer".to_string());

    let exit_code = handlers::handle_review(&config, credentials(), None, false)
        .await
        .expect("review succeeds");
    assert_eq!(exit_code, 0);
}

#[tokio::test]
async fn stale_bot_review_is_dismissed_before_resubmitting() {
    let server = MockServer::start().await;
    let original = json!({ "a": plugin_json("New Plugin", &["Author"]) });
    let proposed = json!({ "a": plugin_json("Renamed Plugin", &["Author"]) });

    mount_read_mocks(&server, &original, "MEMBER", &["registry.json"]).await;

    Mock::given(method("GET"))
        .and(path(repo_path(&format!("pulls/{PR}/reviews"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 10,
                "user": { "login": "github-actions[bot]" },
                "state": "CHANGES_REQUESTED"
            },
            {
                "id": 11,
                "user": { "login": "human" },
                "state": "APPROVED"
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(repo_path(&format!("pulls/{PR}/reviews/10/dismissals"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(repo_path(&format!("pulls/{PR}/reviews"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(repo_path(&format!("pulls/{PR}/merge"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "merged": true })))
        .expect(1)
        .mount(&server)
        .await;

    let checkout = tempfile::tempdir().expect("tempdir");
    write_proposed(&checkout, &proposed);
    let config = config_for(&server, &checkout);

    let exit_code = handlers::handle_review(&config, credentials(), None, false)
        .await
        .expect("review succeeds");
    assert_eq!(exit_code, 0);
}

#[tokio::test]
async fn dry_run_submits_nothing() {
    let server = MockServer::start().await;
    let original = json!({ "a": plugin_json("New Plugin", &["Other"]) });
    let proposed = json!({ "a": plugin_json("Renamed Plugin", &["Other"]) });

    mount_read_mocks(&server, &original, "CONTRIBUTOR", &["registry.json"]).await;

    Mock::given(method("POST"))
        .and(path(repo_path(&format!("pulls/{PR}/reviews"))))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let checkout = tempfile::tempdir().expect("tempdir");
    write_proposed(&checkout, &proposed);
    let config = config_for(&server, &checkout);

    let exit_code = handlers::handle_review(&config, credentials(), None, true)
        .await
        .expect("review succeeds");
    assert_eq!(exit_code, 1);
}

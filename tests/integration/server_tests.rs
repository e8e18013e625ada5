//! Integration tests for the HTTP API
//!
//! These tests start the API on an ephemeral port and point it at wiremock
//! servers standing in for the sites being checked.

use linkscout::config::Config;
use linkscout::server::{router, AppState};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Starts the API and returns its base URL
async fn spawn_api() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    let mut config = Config::default();
    config.checker.max_retries = 0;
    config.checker.retry_backoff_ms = 0;
    let state = AppState::from_config(&config).expect("Failed to build state");

    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    format!("http://{}", addr)
}

/// A site whose homepage links to one live and one missing page
async fn spawn_site() -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body><a href="/ok">OK</a><a href="/missing">Missing</a></body></html>"#,
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    mock_server
}

#[tokio::test]
async fn test_post_without_url_is_rejected() {
    let api = spawn_api().await;

    let response = reqwest::Client::new()
        .post(format!("{}/broken-links", api))
        .json(&json!({ "type": "page" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "url is required");
}

#[tokio::test]
async fn test_post_with_invalid_body_is_rejected() {
    let api = spawn_api().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/broken-links", api))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = client
        .post(format!("{}/broken-links", api))
        .json(&json!({ "url": "https://example.com", "type": "everything" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = client
        .post(format!("{}/broken-links", api))
        .json(&json!({ "url": "not a url" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);

    let response = client
        .post(format!("{}/broken-links", api))
        .json(&json!({ "url": "https://example.com", "options": { "excludePatterns": ["("] } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_get_without_url_is_rejected() {
    let api = spawn_api().await;

    let response = reqwest::get(format!("{}/broken-links", api)).await.unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "url is required");
}

#[tokio::test]
async fn test_post_page_check() {
    let api = spawn_api().await;
    let site = spawn_site().await;

    let response = reqwest::Client::new()
        .post(format!("{}/broken-links", api))
        .json(&json!({
            "url": site.uri(),
            "type": "page",
            "options": { "timeout": 5000, "maxPages": 3 }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["status"], "success");
    assert_eq!(data["totalLinks"], 2);
    assert_eq!(data["brokenLinkCount"], 1);
    assert_eq!(data["brokenLinks"][0]["url"], format!("{}/missing", site.uri()));
    assert_eq!(data["brokenLinks"][0]["statusCode"], 404);
    assert_eq!(data["checkedPages"][0], format!("{}/", site.uri()));

    assert_eq!(data["categorized"]["total"], 1);
    assert_eq!(data["categorized"]["counts"]["Not Found"], 1);
    assert_eq!(data["categorized"]["counts"]["Server Error"], 0);
    assert_eq!(
        data["categorized"]["categories"]["Not Found"][0]["url"],
        format!("{}/missing", site.uri())
    );

    assert_eq!(data["metadata"]["checkType"], "page");
    assert_eq!(data["metadata"]["options"]["timeout"], 5000);
    assert_eq!(data["metadata"]["options"]["maxPages"], 3);
    assert!(data["metadata"]["timestamp"].is_string());
}

#[tokio::test]
async fn test_post_defaults_to_page_check() {
    let api = spawn_api().await;
    let site = spawn_site().await;

    let response = reqwest::Client::new()
        .post(format!("{}/broken-links", api))
        .json(&json!({ "url": site.uri() }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["metadata"]["checkType"], "page");
    assert_eq!(body["data"]["totalLinks"], 2);
}

#[tokio::test]
async fn test_post_unreachable_page_reports_error_status() {
    let api = spawn_api().await;
    let site = MockServer::start().await;

    let response = reqwest::Client::new()
        .post(format!("{}/broken-links", api))
        .json(&json!({ "url": format!("{}/nowhere", site.uri()), "type": "page" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "error");
    assert_eq!(body["data"]["checkedPages"], json!([]));
    assert_eq!(body["data"]["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_post_single_check() {
    let api = spawn_api().await;
    let site = spawn_site().await;

    let response = reqwest::Client::new()
        .post(format!("{}/broken-links", api))
        .json(&json!({ "url": format!("{}/missing", site.uri()), "type": "single" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let data = &body["data"];
    assert_eq!(data["metadata"]["checkType"], "single");
    assert_eq!(data["totalLinks"], 1);
    assert_eq!(data["brokenLinkCount"], 1);
    assert_eq!(data["checkedPages"], json!([format!("{}/missing", site.uri())]));
    assert_eq!(data["categorized"]["counts"]["Not Found"], 1);
}

#[tokio::test]
async fn test_get_quick_check() {
    let api = spawn_api().await;
    let site = spawn_site().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/broken-links", api))
        .query(&[("url", format!("{}/ok", site.uri()))])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["isBroken"], false);
    assert!(body["data"]["result"].is_null());

    let response = client
        .get(format!("{}/broken-links", api))
        .query(&[("url", format!("{}/missing", site.uri()))])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["isBroken"], true);
    assert_eq!(body["data"]["result"]["statusCode"], 404);
    assert_eq!(body["data"]["result"]["reason"], "Not Found");
}

#[tokio::test]
async fn test_healthz() {
    let api = spawn_api().await;

    let response = reqwest::get(format!("{}/healthz", api)).await.unwrap();

    assert_eq!(response.status(), 200);
}

//! Integration tests for the link checker
//!
//! These tests use wiremock to create mock HTTP servers and run page, site
//! and single-URL checks end-to-end.

use linkscout::crawler::{
    build_http_client, fetch_page, CheckOptions, CheckStatus, ErrorKind, FetchMethod,
    FetchOptions, LinkChecker,
};
use linkscout::output::{categorize, Category};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Options tuned for fast, deterministic tests
fn test_options() -> CheckOptions {
    CheckOptions {
        timeout: Duration::from_secs(5),
        max_retries: 0,
        retry_backoff: Duration::ZERO,
        ..CheckOptions::default()
    }
}

fn checker(options: CheckOptions) -> LinkChecker {
    LinkChecker::new(options, "TestChecker/1.0 (+https://example.com/test)")
        .expect("Failed to create checker")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!(
            "<html><head><title>Test</title></head><body>{}</body></html>",
            body
        ),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_single_broken_link() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/missing">Missing</a>"#).await;

    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = checker(CheckOptions {
        max_retries: 3,
        ..test_options()
    })
    .check_page_links(&format!("{}/", mock_server.uri()))
    .await
    .unwrap();

    assert_eq!(result.status, CheckStatus::Success);
    assert_eq!(result.total_links, 1);
    assert_eq!(result.broken_link_count, 1);
    assert_eq!(result.broken_links.len(), 1);

    let broken = &result.broken_links[0];
    assert_eq!(broken.url, format!("{}/missing", mock_server.uri()));
    assert_eq!(broken.status_code, Some(404));
    assert_eq!(broken.reason, "Not Found");
    assert_eq!(broken.parent, format!("{}/", mock_server.uri()));
    assert_eq!(broken.link_text, "Missing");
    assert!(broken.is_internal);
    assert!(broken.is_broken);

    let report = categorize(&result.broken_links);
    assert_eq!(report.counts[&Category::NotFound], 1);
}

#[tokio::test]
async fn test_healthy_page_has_no_broken_links() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r##"<a href="/ok">OK</a><a href="#top">Top</a><a href="mailto:a@b.c">Mail</a>"##,
    )
    .await;

    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let result = checker(test_options())
        .check_page_links(&mock_server.uri())
        .await
        .unwrap();

    assert_eq!(result.status, CheckStatus::Success);
    assert_eq!(result.total_links, 1);
    assert!(result.broken_links.is_empty());
    assert_eq!(result.checked_pages, vec![format!("{}/", mock_server.uri())]);
}

#[tokio::test]
async fn test_retry_then_success_is_not_broken() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/flaky">Flaky</a>"#).await;

    // The first two attempts time out
    Mock::given(method("HEAD"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let result = checker(CheckOptions {
        timeout: Duration::from_millis(300),
        max_retries: 2,
        ..test_options()
    })
    .check_page_links(&mock_server.uri())
    .await
    .unwrap();

    assert_eq!(result.total_links, 1);
    assert!(result.broken_links.is_empty());
}

#[tokio::test]
async fn test_timeout_after_retries_is_broken() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/slow">Slow</a>"#).await;

    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let result = checker(CheckOptions {
        timeout: Duration::from_millis(200),
        max_retries: 1,
        ..test_options()
    })
    .check_page_links(&mock_server.uri())
    .await
    .unwrap();

    assert_eq!(result.broken_link_count, 1);
    let broken = &result.broken_links[0];
    assert_eq!(broken.status_code, None);
    assert_eq!(broken.error_kind, Some(ErrorKind::Timeout));
    assert!(broken.reason.starts_with("Timeout"));

    let report = categorize(&result.broken_links);
    assert_eq!(report.counts[&Category::Timeout], 1);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/boom">Boom</a>"#).await;

    Mock::given(method("HEAD"))
        .and(path("/boom"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = checker(CheckOptions {
        max_retries: 3,
        ..test_options()
    })
    .check_page_links(&mock_server.uri())
    .await
    .unwrap();

    assert_eq!(result.broken_links[0].status_code, Some(503));
    assert_eq!(result.broken_links[0].reason, "Service Unavailable");
    let report = categorize(&result.broken_links);
    assert_eq!(report.counts[&Category::ServerError], 1);
}

#[tokio::test]
async fn test_head_not_allowed_falls_back_to_get() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/no-head">A</a><a href="/no-head-gone">B</a>"#,
    )
    .await;

    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/no-head-gone"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = checker(test_options())
        .check_page_links(&mock_server.uri())
        .await
        .unwrap();

    assert_eq!(result.total_links, 2);
    assert_eq!(result.broken_link_count, 1);
    assert_eq!(
        result.broken_links[0].url,
        format!("{}/no-head-gone", mock_server.uri())
    );
    assert_eq!(result.broken_links[0].status_code, Some(410));
}

#[tokio::test]
async fn test_broken_links_keep_document_order() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/first">1</a><a href="/fine">2</a><a href="/second">3</a>"#,
    )
    .await;

    // The first link answers last
    Mock::given(method("HEAD"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_millis(300)))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/fine"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let result = checker(test_options())
        .check_page_links(&mock_server.uri())
        .await
        .unwrap();

    let urls: Vec<String> = result.broken_links.iter().map(|b| b.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/first", mock_server.uri()),
            format!("{}/second", mock_server.uri()),
        ]
    );
}

#[tokio::test]
async fn test_duplicate_links_are_checked_once() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/dup">1</a><a href="/dup#part">2</a><a href="/dup">3</a>"#,
    )
    .await;

    Mock::given(method("HEAD"))
        .and(path("/dup"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = checker(test_options())
        .check_page_links(&mock_server.uri())
        .await
        .unwrap();

    assert_eq!(result.total_links, 1);
}

#[tokio::test]
async fn test_exclude_patterns_skip_links() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/ads/banner">Ad</a><a href="/docs">Docs</a>"#,
    )
    .await;

    Mock::given(method("HEAD"))
        .and(path("/ads/banner"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let result = checker(CheckOptions {
        exclude_patterns: vec!["/ads/".to_string()],
        ..test_options()
    })
    .check_page_links(&mock_server.uri())
    .await
    .unwrap();

    assert_eq!(result.total_links, 1);
    assert!(result.broken_links.is_empty());
}

#[tokio::test]
async fn test_custom_user_agent_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/ua"))
        .and(header("user-agent", "CustomAuditor/2.0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let broken = checker(CheckOptions {
        user_agent: Some("CustomAuditor/2.0".to_string()),
        ..test_options()
    })
    .check_single_url(&format!("{}/ua", mock_server.uri()))
    .await
    .unwrap();

    assert!(broken.is_none());
}

#[tokio::test]
async fn test_unreachable_page_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let result = checker(test_options())
        .check_page_links(&mock_server.uri())
        .await
        .unwrap();

    assert_eq!(result.status, CheckStatus::Error);
    assert!(result.checked_pages.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("500"));
    assert_eq!(result.total_links, 0);
}

#[tokio::test]
async fn test_unresolvable_site_is_an_error() {
    let result = checker(CheckOptions {
        timeout: Duration::from_secs(3),
        ..test_options()
    })
    .check_site_links("https://this-domain-does-not-exist.invalid")
    .await
    .unwrap();

    assert_eq!(result.status, CheckStatus::Error);
    assert!(result.checked_pages.is_empty());
    assert!(!result.errors.is_empty());
    assert_eq!(result.broken_link_count, 0);
}

#[tokio::test]
async fn test_invalid_seed_is_rejected() {
    let checker = checker(test_options());

    let err = checker.check_site_links("not a url").await.unwrap_err();
    assert!(err.is_input_error());

    let err = checker.check_page_links("ftp://example.com/").await.unwrap_err();
    assert!(err.is_input_error());
}

#[tokio::test]
async fn test_max_pages_truncation() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    let entries: String = (1..=20)
        .map(|i| format!("<url><loc>{}/page-{:02}</loc></url>", base, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(r#"<?xml version="1.0"?><urlset>{}</urlset>"#, entries),
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    // Every page (homepage included) is an empty HTML document
    Mock::given(method("GET"))
        .respond_with(html(""))
        .mount(&mock_server)
        .await;

    let result = checker(CheckOptions {
        max_pages: 5,
        ..test_options()
    })
    .check_site_links(&base)
    .await
    .unwrap();

    assert_eq!(result.status, CheckStatus::Success);
    assert_eq!(
        result.checked_pages,
        vec![
            format!("{}/", base),
            format!("{}/page-01", base),
            format!("{}/page-02", base),
            format!("{}/page-03", base),
            format!("{}/page-04", base),
        ]
    );
}

#[tokio::test]
async fn test_site_check_reports_partial_failures() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            format!(
                "<urlset><url><loc>{0}/</loc></url><url><loc>{0}/good</loc></url><url><loc>{0}/down</loc></url></urlset>",
                base
            ),
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/", r#"<a href="/good">Good</a>"#).await;
    mount_page(&mock_server, "/good", r#"<a href="/gone">Gone</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/good"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let result = checker(test_options())
        .check_site_links(&base)
        .await
        .unwrap();

    assert_eq!(result.status, CheckStatus::Success);
    assert_eq!(
        result.checked_pages,
        vec![format!("{}/", base), format!("{}/good", base)]
    );
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("/down"));
    assert_eq!(result.total_links, 2);
    assert_eq!(result.broken_link_count, 1);
    assert_eq!(result.broken_links[0].parent, format!("{}/good", base));
}

#[tokio::test]
async fn test_check_single_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let checker = checker(test_options());

    let ok = checker
        .check_single_url(&format!("{}/ok", mock_server.uri()))
        .await
        .unwrap();
    assert!(ok.is_none());

    let gone = checker
        .check_single_url(&format!("{}/gone", mock_server.uri()))
        .await
        .unwrap()
        .expect("404 should be reported as broken");
    assert_eq!(gone.status_code, Some(404));
    assert_eq!(gone.parent, "");
    assert!(!gone.is_internal);
}

#[tokio::test]
async fn test_images_are_checked_when_enabled() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/ok">OK</a><img src="/missing.png" alt="Logo">"#,
    )
    .await;

    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let result = checker(CheckOptions {
        check_images: true,
        ..test_options()
    })
    .check_page_links(&mock_server.uri())
    .await
    .unwrap();

    assert_eq!(result.total_links, 2);
    assert_eq!(result.broken_link_count, 1);
    assert_eq!(result.broken_links[0].tag, "img");
    assert_eq!(result.broken_links[0].attribute, "src");
    assert_eq!(result.broken_links[0].link_text, "Logo");
}

#[tokio::test]
async fn test_relative_links_resolve_against_redirect_target() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/docs/", base).as_str()),
        )
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/docs/", r#"<a href="intro">Intro</a>"#).await;

    Mock::given(method("HEAD"))
        .and(path("/docs/intro"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/intro"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = checker(test_options())
        .check_page_links(&format!("{}/docs", base))
        .await
        .unwrap();

    assert_eq!(result.status, CheckStatus::Success);
    assert_eq!(result.total_links, 1);
    assert_eq!(result.broken_link_count, 0);
    assert_eq!(result.checked_pages, vec![format!("{}/docs", base)]);
}

#[tokio::test]
async fn test_broken_link_parent_is_redirect_target() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/new/", base).as_str()),
        )
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/new/", r#"<a href="gone">Gone</a>"#).await;

    let result = checker(test_options())
        .check_page_links(&format!("{}/old", base))
        .await
        .unwrap();

    assert_eq!(result.broken_link_count, 1);
    let broken = &result.broken_links[0];
    assert_eq!(broken.url, format!("{}/new/gone", base));
    assert_eq!(broken.parent, format!("{}/new/", base));
    assert!(broken.is_internal);
}

#[tokio::test]
async fn test_html_served_as_plain_text_is_still_parsed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<!DOCTYPE html><html><body><a href="/missing">Missing</a></body></html>"#,
            "text/plain",
        ))
        .mount(&mock_server)
        .await;

    let result = checker(test_options())
        .check_page_links(&mock_server.uri())
        .await
        .unwrap();

    assert_eq!(result.total_links, 1);
    assert_eq!(result.broken_link_count, 1);
}

#[tokio::test]
async fn test_non_html_page_has_no_links() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"href": "<a href=\"/x\">x</a>"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let result = checker(test_options())
        .check_page_links(&format!("{}/data.json", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(result.status, CheckStatus::Success);
    assert_eq!(result.total_links, 0);
}

#[tokio::test]
async fn test_page_body_is_capped() {
    let mock_server = MockServer::start().await;
    let body = format!("<html><body>{}</body></html>", "x".repeat(4096));

    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(&mock_server)
        .await;

    let client = build_http_client("TestChecker/1.0").unwrap();
    let options = FetchOptions {
        max_retries: 0,
        max_body_bytes: 100,
        ..FetchOptions::default()
    }
    .with_method(FetchMethod::Get);

    let page = fetch_page(&client, &format!("{}/big", mock_server.uri()), &options)
        .await
        .unwrap();

    assert_eq!(page.status_code, 200);
    assert_eq!(page.body.len(), 100);
    assert!(page.body.starts_with("<html><body>xxx"));
}

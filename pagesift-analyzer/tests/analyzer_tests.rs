// End-to-end analyzer tests against mock HTTP servers.

use pagesift_analyzer::{AnalyzeError, Analyzer, AnalyzerConfig, CancelToken, HtmlVersion};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_analyzer() -> Analyzer {
    Analyzer::new(AnalyzerConfig {
        max_workers: 3,
        request_timeout_secs: 5,
        link_timeout_secs: 2,
        max_redirects: 5,
    })
}

async fn mount_page(server: &MockServer, html: String) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(html),
        )
        .mount(server)
        .await;
}

async fn mount_head_ok(server: &MockServer, at: &str) {
    Mock::given(method("HEAD"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

// ============================================================================
// Full analysis
// ============================================================================

#[tokio::test]
async fn test_complete_analysis() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><title>Test Web Page Analysis</title></head>
<body>
    <h1>Main Heading</h1>
    <h2>Section One</h2>
    <h2>Section Two</h2>
    <h3>Subsection</h3>
    <nav>
        <a href="/about">About Us</a>
        <a href="/contact">Contact</a>
        <a href="{external}/">External Link</a>
    </nav>
    <main><a href="/internal-page">Internal Page</a></main>
    <footer>
        <form id="login-form">
            <input type="email" name="email" placeholder="Email">
            <input type="password" name="password" placeholder="Password">
            <button type="submit">Login</button>
        </form>
        <form id="search-form">
            <input type="text" name="query" placeholder="Search">
        </form>
    </footer>
</body>
</html>"#,
        external = external.uri(),
    );

    mount_page(&site, html).await;
    mount_head_ok(&site, "/about").await;
    mount_head_ok(&site, "/contact").await;
    mount_head_ok(&site, "/internal-page").await;
    mount_head_ok(&external, "/").await;

    let cancel = CancelToken::new();
    let result = test_analyzer().analyze(&site.uri(), &cancel).await.unwrap();

    assert_eq!(result.title, "Test Web Page Analysis");
    assert_eq!(result.html_version, HtmlVersion::Html5);
    assert_eq!(result.headings["h1"], 1);
    assert_eq!(result.headings["h2"], 2);
    assert_eq!(result.headings["h3"], 1);
    assert_eq!(result.headings["h4"], 0);
    assert_eq!(result.internal_links, 3);
    assert_eq!(result.external_links, 1);
    assert_eq!(result.inaccessible_links, 0);
    assert!(result.has_login_form);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_dead_links_show_up_in_the_count() {
    let site = MockServer::start().await;

    let html = r#"<html><body>
        <a href="/alive">ok</a>
        <a href="/dead">gone</a>
    </body></html>"#;

    mount_page(&site, html.to_string()).await;
    mount_head_ok(&site, "/alive").await;
    Mock::given(method("HEAD"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let cancel = CancelToken::new();
    let result = test_analyzer().analyze(&site.uri(), &cancel).await.unwrap();

    assert_eq!(result.internal_links, 2);
    assert_eq!(result.inaccessible_links, 1);
}

#[tokio::test]
async fn test_page_without_links_makes_no_probes() {
    let site = MockServer::start().await;
    mount_page(&site, "<html><body><h1>plain</h1></body></html>".to_string()).await;

    let cancel = CancelToken::new();
    let result = test_analyzer().analyze(&site.uri(), &cancel).await.unwrap();

    assert_eq!(result.internal_links + result.external_links, 0);
    assert_eq!(result.inaccessible_links, 0);

    // Only the page fetch reached the server.
    let requests = site.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

// ============================================================================
// Failure modes
// ============================================================================

#[tokio::test]
async fn test_http_error_statuses_are_fatal() {
    for status in [401u16, 403, 404, 500] {
        let site = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&site)
            .await;

        let cancel = CancelToken::new();
        let err = test_analyzer()
            .analyze(&site.uri(), &cancel)
            .await
            .expect_err("non-2xx fetch must fail the analysis");

        match err {
            AnalyzeError::Status(code) => assert_eq!(code, status),
            other => panic!("expected status error, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><title>Slow</title></html>")
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&site)
        .await;

    let analyzer = Analyzer::new(AnalyzerConfig {
        max_workers: 3,
        request_timeout_secs: 1,
        link_timeout_secs: 1,
        max_redirects: 5,
    });

    let cancel = CancelToken::new();
    let err = analyzer.analyze(&site.uri(), &cancel).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn test_cancellation_aborts_the_fetch() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&site)
        .await;

    let cancel = CancelToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(2),
        test_analyzer().analyze(&site.uri(), &cancel),
    )
    .await
    .expect("cancelled analysis must return promptly");

    assert!(matches!(err, Err(AnalyzeError::Cancelled)));
}

#[tokio::test]
async fn test_invalid_target_is_rejected() {
    let cancel = CancelToken::new();
    let err = test_analyzer().analyze("://missing-scheme", &cancel).await;
    assert!(matches!(err, Err(AnalyzeError::InvalidUrl(_))));
}

// ============================================================================
// Target normalization
// ============================================================================

#[tokio::test]
async fn test_scheme_less_target_is_normalized() {
    let site = MockServer::start().await;
    mount_page(&site, "<html><head><title>OK</title></head></html>".to_string()).await;

    // Strip the scheme: "127.0.0.1:PORT/"
    let bare = site.uri().trim_start_matches("http://").to_string();

    let cancel = CancelToken::new();
    let result = test_analyzer().analyze(&bare, &cancel).await.unwrap();

    assert!(result.url.starts_with("http://"));
    assert_eq!(result.title, "OK");
}

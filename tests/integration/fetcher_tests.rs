use super::*;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use restock_watcher::core::fetcher::{fetch_page, HttpFetcher, RetryPolicy};

fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        retry_delay: Duration::from_millis(5),
        request_delay: Duration::ZERO,
    }
}

#[tokio::test]
async fn test_fails_twice_then_succeeds_in_three_attempts() -> anyhow::Result<()> {
    let fetcher = ScriptedFetcher::new(vec![
        network_error("connection reset"),
        network_error("timed out"),
        page(AVAILABLE_PAGE),
    ]);

    let result = fetch_page(&fetcher, PRODUCT_URL, &quick_policy(3)).await?;

    assert_eq!(fetcher.calls(), 3);
    assert_eq!(result.body, AVAILABLE_PAGE);
    Ok(())
}

#[tokio::test]
async fn test_always_failing_uses_every_attempt_and_keeps_error() {
    let fetcher = ScriptedFetcher::new(vec![
        network_error("dns failure 1"),
        network_error("dns failure 2"),
        network_error("dns failure 3"),
        network_error("dns failure 4"),
        network_error("dns failure 5"),
    ]);

    let err = fetch_page(&fetcher, PRODUCT_URL, &quick_policy(4)).await.unwrap_err();

    assert_eq!(fetcher.calls(), 4);
    assert!(matches!(err, AppError::Fetch(ref msg) if msg == "dns failure 4"));
}

#[tokio::test]
async fn test_non_200_status_is_retried() -> anyhow::Result<()> {
    let fetcher = ScriptedFetcher::new(vec![status(503), page(SOLD_OUT_PAGE)]);

    let result = fetch_page(&fetcher, PRODUCT_URL, &quick_policy(3)).await?;

    assert_eq!(fetcher.calls(), 2);
    assert_eq!(result.status, 200);
    Ok(())
}

#[tokio::test]
async fn test_persistent_non_200_reports_status() {
    let fetcher = ScriptedFetcher::new(vec![status(404), status(404)]);

    let err = fetch_page(&fetcher, PRODUCT_URL, &quick_policy(2)).await.unwrap_err();

    assert_eq!(fetcher.calls(), 2);
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_http_fetcher_sends_browser_identity() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/store/detail/TAG3CSDB"))
        .and(header("user-agent", "RestockWatcher-Test/1.0"))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(AVAILABLE_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let config = get_test_config(&[("USER_AGENT", "RestockWatcher-Test/1.0")]);
    let fetcher = HttpFetcher::new(&config.scraper)?;
    let url = format!("{}/store/detail/TAG3CSDB", server.uri());

    let result = fetch_page(&fetcher, &url, &quick_policy(1)).await?;

    assert_eq!(result.status, 200);
    assert_eq!(result.url, url);
    assert_eq!(result.final_url, url);
    assert!(result.body.contains("Add to Cart"));
    Ok(())
}

#[tokio::test]
async fn test_http_fetcher_retries_server_errors() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SOLD_OUT_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let config = get_test_config(&[]);
    let fetcher = HttpFetcher::new(&config.scraper)?;
    let url = format!("{}/product", server.uri());

    let result = fetch_page(&fetcher, &url, &quick_policy(3)).await?;

    assert_eq!(result.status, 200);
    assert!(result.body.contains("Notify Me When In Stock"));
    Ok(())
}

use super::*;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use restock_watcher::core::fetcher::HttpFetcher;
use restock_watcher::Handler;

fn handler_with(fetcher: Arc<ScriptedFetcher>, notifier: MockNotifier) -> Handler {
    Handler::new(fetcher, Arc::new(notifier)).unwrap()
}

#[tokio::test]
async fn test_missing_product_url_fails_without_fetching() -> anyhow::Result<()> {
    let config = get_test_config(&[]);
    let fetcher = Arc::new(ScriptedFetcher::new(vec![page(AVAILABLE_PAGE)]));
    let mut notifier = MockNotifier::new();
    notifier.expect_notify().times(0);

    let handler = handler_with(fetcher.clone(), notifier);
    let response = handler.handle_invocation(&json!({}), &config).await;

    assert_eq!(response.status_code, 500);
    assert_eq!(fetcher.calls(), 0);
    let body = response.body_json()?;
    assert!(body["error"].as_str().unwrap_or_default().contains("PRODUCT_URL"));
    Ok(())
}

#[tokio::test]
async fn test_skip_notification_reports_available_without_sending() -> anyhow::Result<()> {
    let config = get_test_config(&[("PRODUCT_URL", PRODUCT_URL), ("SKIP_NOTIFICATION", "true")]);
    let fetcher = Arc::new(ScriptedFetcher::new(vec![page(AVAILABLE_PAGE)]));
    let mut notifier = MockNotifier::new();
    notifier.expect_notify().times(0);

    let handler = handler_with(fetcher, notifier);
    let report = handler.run(&config).await?;

    assert!(report.product_info.available());
    assert!(!report.notification_sent);
    assert_eq!(report.message_id, None);
    Ok(())
}

#[tokio::test]
async fn test_available_product_records_message_id() -> anyhow::Result<()> {
    let config = get_test_config(&[("PRODUCT_URL", PRODUCT_URL)]);
    let fetcher = Arc::new(ScriptedFetcher::new(vec![page(AVAILABLE_PAGE)]));
    let mut notifier = MockNotifier::new();
    notifier
        .expect_notify()
        .withf(|snapshot| snapshot.price() == "$1,299.99" && snapshot.url() == PRODUCT_URL)
        .times(1)
        .returning(|_| Ok(MessageId("<msg-1@example.com>".to_string())));

    let handler = handler_with(fetcher, notifier);
    let report = handler.run(&config).await?;

    assert!(report.notification_sent);
    assert_eq!(report.message_id.as_deref(), Some("<msg-1@example.com>"));
    Ok(())
}

#[tokio::test]
async fn test_delivery_failure_becomes_500() -> anyhow::Result<()> {
    let config = get_test_config(&[("PRODUCT_URL", PRODUCT_URL)]);
    let fetcher = Arc::new(ScriptedFetcher::new(vec![page(AVAILABLE_PAGE)]));
    let mut notifier = MockNotifier::new();
    notifier
        .expect_notify()
        .times(1)
        .returning(|_| Err(AppError::Delivery("relay refused message".to_string())));

    let handler = handler_with(fetcher, notifier);
    let response = handler.handle_invocation(&json!({ "source": "test" }), &config).await;

    assert_eq!(response.status_code, 500);
    let body = response.body_json()?;
    assert!(body["error"].as_str().unwrap_or_default().contains("relay refused message"));
    Ok(())
}

#[tokio::test]
async fn test_exhausted_fetch_becomes_500() -> anyhow::Result<()> {
    let config = get_test_config(&[("PRODUCT_URL", PRODUCT_URL), ("MAX_ATTEMPTS", "2")]);
    let fetcher = Arc::new(ScriptedFetcher::new(vec![]));
    let mut notifier = MockNotifier::new();
    notifier.expect_notify().times(0);

    let handler = handler_with(fetcher.clone(), notifier);
    let response = handler.handle_invocation(&json!({}), &config).await;

    assert_eq!(response.status_code, 500);
    assert_eq!(fetcher.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_handler_over_http_with_mock_server() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SOLD_OUT_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/store/detail/TAG3CSDB", server.uri());
    let config = get_test_config(&[("PRODUCT_URL", url.as_str())]);
    let mut notifier = MockNotifier::new();
    notifier.expect_notify().times(0);

    let handler = Handler::new(Arc::new(HttpFetcher::new(&config.scraper)?), Arc::new(notifier))?;
    let snapshot = handler.check_product(&config).await?;

    assert_eq!(snapshot.title(), "Yamaha TAG3 C TransAcoustic");
    assert_eq!(snapshot.url(), url);
    assert!(!snapshot.available());
    Ok(())
}

//! Invocation entry point: fetch the configured page, classify it, and send
//! a notification when the product can be bought.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::classifier::ProductPageClassifier;
use crate::core::fetcher::{fetch_page, HttpFetcher, PageFetcher, RetryPolicy};
use crate::models::ProductSnapshot;
use crate::plugins::notifiers::EmailNotifier;
use crate::plugins::NotifierPlugin;
use crate::utils::error::AppError;

/// What the trigger gets back. `body` is a JSON document encoded as a
/// string, matching what function-style schedulers expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub product_info: ProductSnapshot,
    pub notification_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl InvocationResponse {
    pub fn success(report: &CheckReport) -> Self {
        Self {
            status_code: 200,
            body: serde_json::to_string(report)
                .unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string()),
        }
    }

    pub fn failure(error: &AppError) -> Self {
        Self {
            status_code: 500,
            body: json!({ "error": error.to_string() }).to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// Parsed `body`, for callers that want to inspect the outcome.
    pub fn body_json(&self) -> Result<Value, AppError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

pub struct Handler {
    fetcher: Arc<dyn PageFetcher>,
    notifier: Arc<dyn NotifierPlugin>,
    classifier: ProductPageClassifier,
}

impl Handler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<dyn NotifierPlugin>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            fetcher,
            notifier,
            classifier: ProductPageClassifier::new()?,
        })
    }

    /// Production wiring: HTTP fetcher plus SMTP email notifier.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let fetcher = Arc::new(HttpFetcher::new(&config.scraper)?);
        let notifier = Arc::new(EmailNotifier::new(config.notifications.clone()));
        Self::new(fetcher, notifier)
    }

    /// Fetches and classifies the configured product page.
    pub async fn check_product(&self, config: &AppConfig) -> Result<ProductSnapshot, AppError> {
        let url = config.product_url()?;
        let policy = RetryPolicy::from(&config.scraper);

        let page = fetch_page(self.fetcher.as_ref(), url, &policy).await?;
        let classification = self.classifier.classify(&page.body);
        let snapshot = classification.into_snapshot(url);

        tracing::info!(
            "Product check complete: title={:?} price={:?} available={}",
            snapshot.title(),
            snapshot.price(),
            snapshot.available()
        );
        Ok(snapshot)
    }

    pub async fn run(&self, config: &AppConfig) -> Result<CheckReport, AppError> {
        let product_info = self.check_product(config).await?;

        let mut report = CheckReport {
            status_code: 200,
            product_info,
            notification_sent: false,
            message_id: None,
        };

        if report.product_info.available() {
            tracing::info!("Product is available!");
            if config.notifications.skip_notification {
                tracing::info!("Skipping notification as SKIP_NOTIFICATION is set to true");
            } else {
                let message_id = self.notifier.notify(&report.product_info).await?;
                report.notification_sent = true;
                report.message_id = Some(message_id.into());
            }
        } else {
            tracing::info!("Product is not available yet");
        }

        Ok(report)
    }

    /// Handles one trigger. Every error becomes a 500 response; nothing
    /// escapes as a panic or an `Err`.
    pub async fn handle_invocation(&self, event: &Value, config: &AppConfig) -> InvocationResponse {
        tracing::info!("Invoked with event: {}", event);

        match self.run(config).await {
            Ok(report) => InvocationResponse::success(&report),
            Err(e) => {
                tracing::error!("Error in handler: {}", e);
                InvocationResponse::failure(&e)
            }
        }
    }
}

use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL,
    UPGRADE_INSECURE_REQUESTS,
};
use std::time::Duration;
use tokio_retry::Retry;

use crate::config::ScraperConfig;
use crate::models::FetchResult;
use crate::utils::error::AppError;

/// A single page request. Retrying is layered on top by [`fetch_page`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResult, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Attempt `n` failing waits `retry_delay * n` before the next one.
    pub retry_delay: Duration,
    /// Pause before every attempt, including the first.
    pub request_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(5),
            request_delay: Duration::ZERO,
        }
    }
}

impl From<&ScraperConfig> for RetryPolicy {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Waits between attempts: `retry_delay * 1`, `retry_delay * 2`, ...
    /// One fewer than the number of attempts, so the last failure is
    /// returned without sleeping. Saturates at `Duration::MAX`.
    pub fn backoff(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts.max(1)).map(move |n| {
            self.retry_delay.checked_mul(n).unwrap_or(Duration::MAX)
        })
    }
}

/// Fetches `url`, retrying failed attempts and non-200 responses with linear
/// backoff. Returns the last error once the attempt budget is spent.
pub async fn fetch_page(
    fetcher: &dyn PageFetcher,
    url: &str,
    policy: &RetryPolicy,
) -> Result<FetchResult, AppError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    Retry::spawn(policy.backoff(), || {
        attempt += 1;
        let current = attempt;
        async move {
            if !policy.request_delay.is_zero() {
                tokio::time::sleep(policy.request_delay).await;
            }

            tracing::info!("Fetching URL: {} (attempt {}/{})", url, current, max_attempts);

            let outcome = fetcher.get(url).await.and_then(|result| {
                if result.is_ok() {
                    Ok(result)
                } else {
                    Err(AppError::Fetch(format!(
                        "Unexpected HTTP status {} for {}",
                        result.status, url
                    )))
                }
            });

            if let Err(e) = &outcome {
                tracing::warn!("Attempt {} failed: {}", current, e);
            }
            outcome
        }
    })
    .await
}

/// Plain HTTP fetcher dressed up as a desktop browser.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .user_agent(config.user_agent.clone())
            .default_headers(browser_headers())
            .build()?;

        Ok(Self { client })
    }
}

fn browser_headers() -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    h.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    h.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    h.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    h.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static("?0"),
    );
    h.insert(
        HeaderName::from_static("sec-ch-ua-platform"),
        HeaderValue::from_static("\"Windows\""),
    );
    h.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    h.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    h.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    h
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchResult, AppError> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        Ok(FetchResult {
            body,
            status,
            url: url.to_string(),
            final_url,
        })
    }
}

use config::{Config, Environment, Map};
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsString;
use url::Url;

use crate::utils::error::AppError;

/// Desktop Chrome on Windows, the most common profile on retail sites.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub product: ProductConfig,
    pub scraper: ScraperConfig,
    pub notifications: NotificationsConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub request_delay_ms: u64,
    pub request_timeout: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    pub sender_email: Option<String>,
    pub sender_name: String,
    pub recipient_email: Option<String>,
    pub skip_notification: bool,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    pub schedule: Option<String>,
}

// Flat view of the recognised environment keys. `config` lowercases them.
#[derive(Debug, Deserialize)]
struct EnvSettings {
    product_url: Option<String>,
    sender_email: Option<String>,
    sender_name: String,
    recipient_email: Option<String>,
    skip_notification: bool,
    smtp_host: String,
    smtp_port: u16,
    smtp_username: Option<String>,
    smtp_password: Option<String>,
    smtp_use_tls: bool,
    max_attempts: u32,
    retry_delay_ms: u64,
    request_delay_ms: u64,
    request_timeout: u64,
    user_agent: String,
    watch_schedule: Option<String>,
}

impl From<EnvSettings> for AppConfig {
    fn from(s: EnvSettings) -> Self {
        AppConfig {
            product: ProductConfig { url: s.product_url },
            scraper: ScraperConfig {
                max_attempts: s.max_attempts,
                retry_delay_ms: s.retry_delay_ms,
                request_delay_ms: s.request_delay_ms,
                request_timeout: s.request_timeout,
                user_agent: s.user_agent,
            },
            notifications: NotificationsConfig {
                sender_email: s.sender_email,
                sender_name: s.sender_name,
                recipient_email: s.recipient_email,
                skip_notification: s.skip_notification,
                smtp: SmtpConfig {
                    host: s.smtp_host,
                    port: s.smtp_port,
                    username: s.smtp_username,
                    password: s.smtp_password,
                    use_tls: s.smtp_use_tls,
                },
            },
            watch: WatchConfig {
                schedule: s.watch_schedule,
            },
        }
    }
}

fn unicode_vars(vars: impl Iterator<Item = (OsString, OsString)>) -> Map<String, String> {
    vars.filter_map(|(key, value)| {
        Some((key.into_string().ok()?, value.into_string().ok()?))
    })
    .collect()
}

impl AppConfig {
    /// Reads the process environment. Binaries load `.env` before calling this.
    /// Variables that are not valid Unicode are skipped.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_source(unicode_vars(env::vars_os()))
    }

    /// Builds the configuration from an explicit key/value source, e.g.
    /// `PRODUCT_URL=https://...`. Empty values count as unset.
    pub fn from_source(source: Map<String, String>) -> Result<Self, AppError> {
        let s = Config::builder()
            .set_default("sender_name", "Restock Watcher")?
            .set_default("skip_notification", false)?
            .set_default("smtp_host", "localhost")?
            .set_default("smtp_port", 587_i64)?
            .set_default("smtp_use_tls", true)?
            .set_default("max_attempts", 3_i64)?
            .set_default("retry_delay_ms", 5000_i64)?
            .set_default("request_delay_ms", 0_i64)?
            .set_default("request_timeout", 30_i64)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .add_source(Environment::default().source(Some(source)).ignore_empty(true))
            .build()?;

        let settings: EnvSettings = s.try_deserialize()?;
        let config = AppConfig::from(settings);

        config.validate()?;
        Ok(config)
    }

    /// The page to check. Required for every invocation, so a missing value
    /// is reported here rather than at load time.
    pub fn product_url(&self) -> Result<&str, AppError> {
        self.product
            .url
            .as_deref()
            .ok_or_else(|| AppError::config("PRODUCT_URL environment variable must be set"))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(url) = &self.product.url {
            match Url::parse(url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                _ => return Err(AppError::config(format!("Invalid PRODUCT_URL: {}", url))),
            }
        }

        if self.scraper.max_attempts == 0 {
            return Err(AppError::config("MAX_ATTEMPTS must be greater than 0"));
        }

        if self.scraper.request_timeout == 0 {
            return Err(AppError::config("REQUEST_TIMEOUT must be greater than 0"));
        }

        if self.notifications.smtp.port == 0 {
            return Err(AppError::config("SMTP port must be greater than 0"));
        }

        if let Some(schedule) = &self.watch.schedule {
            if !Self::is_valid_cron(schedule) {
                return Err(AppError::config(format!(
                    "Invalid cron expression in WATCH_SCHEDULE: {}",
                    schedule
                )));
            }
        }

        Ok(())
    }

    /// Basic shape check for the scheduler's cron dialect: seconds first,
    /// six or seven fields.
    pub fn is_valid_cron(cron_expr: &str) -> bool {
        let parts: Vec<&str> = cron_expr.split_whitespace().collect();
        if parts.len() != 6 && parts.len() != 7 {
            return false;
        }

        parts.iter().all(|part| {
            part.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '*' | '-' | ',' | '/' | '?'))
        })
    }
}

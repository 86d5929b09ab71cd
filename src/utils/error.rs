use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parsing error: {message}")]
    Parse { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scheduler error: {0}")]
    Scheduler(String),
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config(config::ConfigError::Message(message.into()))
    }

    pub fn parse(message: impl Into<String>) -> Self {
        AppError::Parse {
            message: message.into(),
        }
    }

    /// Fetch failures are worth another try on the next scheduled run;
    /// everything else needs a human or a config change.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Fetch(_) | AppError::Http(_))
    }
}

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

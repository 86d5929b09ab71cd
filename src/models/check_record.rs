use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::ProductSnapshot;
use crate::utils::error::AppError;

/// A probe run saved to disk for later comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub timestamp: DateTime<Utc>,
    pub results: ProductSnapshot,
}

impl CheckRecord {
    pub fn now(results: ProductSnapshot) -> Self {
        Self {
            timestamp: Utc::now(),
            results,
        }
    }

    /// Writes the record as pretty-printed JSON, replacing any existing file.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

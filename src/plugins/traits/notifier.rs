use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::ProductSnapshot;
use crate::utils::error::AppError;

/// Identifier of a sent notification, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

/// Trait for implementing notification methods.
///
/// Implementations return `AppError::Config` when the sender or recipient
/// is missing or malformed and `AppError::Delivery` when the transport
/// fails. Callers do not retry either.
#[async_trait]
pub trait NotifierPlugin: Send + Sync {
    /// Plugin metadata
    fn name(&self) -> &'static str;

    async fn notify(&self, snapshot: &ProductSnapshot) -> Result<MessageId, AppError>;
}

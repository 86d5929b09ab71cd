use async_trait::async_trait;
use uuid::Uuid;

use crate::models::ProductSnapshot;
use crate::plugins::notifiers::email::EmailMessage;
use crate::plugins::traits::{MessageId, NotifierPlugin};
use crate::utils::error::AppError;

/// Logs the email it would have sent. Used by the probe tool when only
/// placeholder addresses are available.
pub struct DryRunNotifier {
    sender: String,
    recipient: String,
}

impl DryRunNotifier {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
        }
    }
}

#[async_trait]
impl NotifierPlugin for DryRunNotifier {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn notify(&self, snapshot: &ProductSnapshot) -> Result<MessageId, AppError> {
        let content = EmailMessage::for_snapshot(snapshot);

        tracing::info!("Skipping actual email send (dry run)");
        tracing::info!("Would send email from {} to {}", self.sender, self.recipient);
        tracing::info!("Subject: {}", content.subject);
        tracing::debug!("Body:\n{}", content.text_body);

        Ok(MessageId(format!("dry-run-{}", Uuid::new_v4())))
    }
}

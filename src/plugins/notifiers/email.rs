use async_trait::async_trait;
use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

use crate::config::NotificationsConfig;
use crate::models::ProductSnapshot;
use crate::plugins::traits::{MessageId, NotifierPlugin};
use crate::utils::error::AppError;

/// Rendered notification content, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

impl EmailMessage {
    pub fn for_snapshot(snapshot: &ProductSnapshot) -> Self {
        Self {
            subject: format!("Product Available: {}", snapshot.title()),
            text_body: format_text_body(snapshot),
            html_body: format_html_body(snapshot),
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_html_body(snapshot: &ProductSnapshot) -> String {
    let title = escape_html(snapshot.title());
    let price = escape_html(snapshot.price());
    let url = escape_html(snapshot.url());

    format!(
        r#"<!DOCTYPE html>
<html>
<head></head>
<body>
    <h2>Good news! The product you're tracking is now available!</h2>
    <p><strong>Product:</strong> {title}</p>
    <p><strong>Price:</strong> {price}</p>
    <p><strong>URL:</strong> <a href="{url}">{url}</a></p>
    <br>
    <p><a href="{url}" style="background-color: #4CAF50; color: white; padding: 10px 20px; text-decoration: none; border-radius: 4px;">View Product</a></p>
</body>
</html>
"#
    )
}

fn format_text_body(snapshot: &ProductSnapshot) -> String {
    let mut text = String::new();

    text.push_str("Good news! The product you're tracking is now available!\n\n");
    text.push_str(&format!("Product: {}\n", snapshot.title()));
    text.push_str(&format!("Price: {}\n", snapshot.price()));
    text.push_str(&format!("URL: {}\n", snapshot.url()));

    text
}

fn parse_address(label: &str, value: &str) -> Result<Address, AppError> {
    value
        .trim()
        .parse::<Address>()
        .map_err(|e| {
            AppError::config(format!(
                "{} is not a valid email address ({}): {}",
                label, value, e
            ))
        })
}

pub struct EmailNotifier {
    config: NotificationsConfig,
}

impl EmailNotifier {
    pub fn new(config: NotificationsConfig) -> Self {
        EmailNotifier { config }
    }

    fn addresses(&self) -> Result<(Mailbox, Mailbox), AppError> {
        let (Some(sender), Some(recipient)) = (
            self.config.sender_email.as_deref(),
            self.config.recipient_email.as_deref(),
        ) else {
            return Err(AppError::config(
                "SENDER_EMAIL and RECIPIENT_EMAIL environment variables must be set",
            ));
        };

        let from = Mailbox::new(
            Some(self.config.sender_name.clone()),
            parse_address("SENDER_EMAIL", sender)?,
        );
        let to = Mailbox::new(None, parse_address("RECIPIENT_EMAIL", recipient)?);

        Ok((from, to))
    }

    /// Builds the outgoing multipart message. The `Message-ID` header is
    /// generated here so it can be reported back once the send succeeds.
    pub fn build_message(
        &self,
        snapshot: &ProductSnapshot,
    ) -> Result<(Message, MessageId), AppError> {
        let (from, to) = self.addresses()?;
        let content = EmailMessage::for_snapshot(snapshot);
        let message_id = MessageId(format!("<{}@{}>", Uuid::new_v4(), from.email.domain()));

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(content.subject)
            .message_id(Some(message_id.0.clone()))
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(content.text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(content.html_body),
                    ),
            )
            .map_err(|e| AppError::Delivery(format!("Failed to build email: {}", e)))?;

        Ok((email, message_id))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, AppError> {
        let smtp = &self.config.smtp;

        let builder = if smtp.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                .map_err(|e| {
                    AppError::Delivery(format!(
                        "Failed to configure SMTP relay {}: {}",
                        smtp.host, e
                    ))
                })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
        };

        let mut builder = builder.port(smtp.port);
        if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl NotifierPlugin for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn notify(&self, snapshot: &ProductSnapshot) -> Result<MessageId, AppError> {
        let (email, message_id) = self.build_message(snapshot)?;
        let mailer = self.transport()?;

        match mailer.send(email).await {
            Ok(_response) => {
                tracing::info!("Email sent! Message ID: {}", message_id);
                Ok(message_id)
            }
            Err(e) => {
                tracing::error!("Error sending email: {}", e);
                Err(AppError::Delivery(e.to_string()))
            }
        }
    }
}

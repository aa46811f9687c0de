//! Transactional email transport abstraction.
//!
//! `EmailSender` is the seam between jobs and delivery - `ResendEmailSender`
//! in production, `LogEmailSender` when no API key is configured, and
//! `FakeEmailSender` in tests. Object-safe so callers hold
//! `Arc<dyn EmailSender>`.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::info;

/// A rendered email ready to send.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, msg: EmailMessage) -> Result<()>;
}

// =============================================================================
// LogEmailSender - writes to tracing (dev / staging)
// =============================================================================

pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, msg: EmailMessage) -> Result<()> {
        info!(
            to = %msg.to,
            subject = %msg.subject,
            "[LogEmailSender] Would send email\n{}",
            msg.text,
        );
        Ok(())
    }
}

// =============================================================================
// FakeEmailSender - captures sent messages for assertions (tests)
// =============================================================================

#[derive(Default)]
pub struct FakeEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
}

impl FakeEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }

    pub fn last_message(&self) -> Option<EmailMessage> {
        self.sent.lock().last().cloned()
    }
}

#[async_trait]
impl EmailSender for FakeEmailSender {
    async fn send(&self, msg: EmailMessage) -> Result<()> {
        self.sent.lock().push(msg);
        Ok(())
    }
}

// =============================================================================
// ResendEmailSender - live Resend.com API
// =============================================================================

pub struct ResendEmailSender {
    api_key: String,
    from: String,
}

impl ResendEmailSender {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            from: from.into(),
        }
    }

    /// Build from `RESEND_API_KEY` and `EMAIL_FROM_ADDRESS`.
    /// Returns `None` if no API key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("RESEND_API_KEY").ok()?;
        let from = std::env::var("EMAIL_FROM_ADDRESS")
            .unwrap_or_else(|_| "noreply@orbis.example".to_string());
        Some(Self::new(api_key, from))
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, msg: EmailMessage) -> Result<()> {
        let client = reqwest::Client::new();

        let mut body = HashMap::new();
        body.insert("from", self.from.as_str());
        body.insert("to", msg.to.as_str());
        body.insert("subject", msg.subject.as_str());
        body.insert("html", msg.html.as_str());
        body.insert("text", msg.text.as_str());

        let response = client
            .post("https://api.resend.com/emails")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("Resend API returned {status}: {detail}"));
        }

        Ok(())
    }
}

/// Pick the configured transport: Resend when an API key is present,
/// otherwise log-only.
pub fn create_email_sender() -> Box<dyn EmailSender> {
    match ResendEmailSender::from_env() {
        Some(sender) => {
            info!("Email transport: Resend");
            Box::new(sender)
        }
        None => {
            info!("Email transport: log-only (RESEND_API_KEY not set)");
            Box::new(LogEmailSender)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_sender_captures_messages() {
        let sender = FakeEmailSender::new();
        sender
            .send(EmailMessage {
                to: "head@orbis.example".to_string(),
                subject: "Tomorrow's visits".to_string(),
                html: "<p>2 visits</p>".to_string(),
                text: "2 visits".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(sender.sent_messages().len(), 1);
        assert_eq!(sender.last_message().unwrap().subject, "Tomorrow's visits");
    }

    #[tokio::test]
    async fn test_log_sender_always_succeeds() {
        let sender = LogEmailSender;
        let result = sender
            .send(EmailMessage {
                to: "x@orbis.example".to_string(),
                subject: "s".to_string(),
                html: String::new(),
                text: String::new(),
            })
            .await;
        assert!(result.is_ok());
    }
}

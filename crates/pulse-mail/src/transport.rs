//! Delivery transport seam
//!
//! Real SMTP/IMAP traffic happens behind these traits; the API layer never
//! talks to a provider directly. `LogTransport` is the development default,
//! `TestTransport` collects messages for assertions.

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::info;

use crate::message::OutgoingMail;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Send failed: {0}")]
    SendFailed(String),
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
    #[error("Transport not configured")]
    NotConfigured,
}

pub type MailResult<T> = Result<T, MailError>;

/// Outbound delivery
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send a message, returning its id
    async fn send(&self, message: &OutgoingMail) -> MailResult<String>;

    fn is_configured(&self) -> bool;
}

/// Logs messages instead of sending them (development default)
#[derive(Default)]
pub struct LogTransport;

impl LogTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, message: &OutgoingMail) -> MailResult<String> {
        if message.to.is_empty() {
            return Err(MailError::InvalidRecipient("no recipients".into()));
        }

        info!(
            from = %message.from.to_rfc5322(),
            to = %message
                .to
                .iter()
                .map(|a| a.to_rfc5322())
                .collect::<Vec<_>>()
                .join(", "),
            subject = %message.subject,
            "Outgoing mail (log transport)"
        );

        Ok(message.id.clone())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Collects sent messages in memory for test assertions
#[derive(Default)]
pub struct TestTransport {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl TestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl MailTransport for TestTransport {
    async fn send(&self, message: &OutgoingMail) -> MailResult<String> {
        if message.to.is_empty() {
            return Err(MailError::InvalidRecipient("no recipients".into()));
        }
        self.sent.lock().push(message.clone());
        Ok(message.id.clone())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MailAddress;

    fn sample_mail() -> OutgoingMail {
        OutgoingMail::new(
            MailAddress::new("from@example.it"),
            vec![MailAddress::new("to@example.it")],
            "Subject",
            "Body",
        )
    }

    #[tokio::test]
    async fn test_test_transport_collects() {
        let transport = TestTransport::new();
        transport.send(&sample_mail()).await.unwrap();
        transport.send(&sample_mail()).await.unwrap();

        assert_eq!(transport.sent_count(), 2);
        assert_eq!(transport.sent()[0].subject, "Subject");
    }

    #[tokio::test]
    async fn test_empty_recipients_rejected() {
        let transport = TestTransport::new();
        let mut mail = sample_mail();
        mail.to.clear();

        assert!(matches!(
            transport.send(&mail).await,
            Err(MailError::InvalidRecipient(_))
        ));
        assert_eq!(transport.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_log_transport_returns_id() {
        let transport = LogTransport::new();
        let mail = sample_mail();
        let id = transport.send(&mail).await.unwrap();
        assert_eq!(id, mail.id);
    }
}

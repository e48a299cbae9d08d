//! Outgoing message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Email address with optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailAddress {
    pub email: String,
    pub name: Option<String>,
}

impl MailAddress {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Format as RFC 5322
    pub fn to_rfc5322(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

/// An outgoing email, built by handlers and handed to a transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingMail {
    pub id: String,
    pub from: MailAddress,
    pub to: Vec<MailAddress>,
    pub cc: Vec<MailAddress>,
    pub reply_to: Option<MailAddress>,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OutgoingMail {
    pub fn new(
        from: MailAddress,
        to: Vec<MailAddress>,
        subject: impl Into<String>,
        text_body: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            from,
            to,
            cc: Vec::new(),
            reply_to: None,
            subject: subject.into(),
            text_body: text_body.into(),
            html_body: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    pub fn cc(mut self, addresses: Vec<MailAddress>) -> Self {
        self.cc = addresses;
        self
    }

    pub fn reply_to(mut self, address: MailAddress) -> Self {
        self.reply_to = Some(address);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc5322_formatting() {
        assert_eq!(
            MailAddress::new("a@b.it").with_name("Anna B").to_rfc5322(),
            "Anna B <a@b.it>"
        );
        assert_eq!(MailAddress::new("a@b.it").to_rfc5322(), "a@b.it");
    }

    #[test]
    fn test_builder() {
        let mail = OutgoingMail::new(
            MailAddress::new("from@example.it"),
            vec![MailAddress::new("to@example.it")],
            "Hello",
            "Plain body",
        )
        .with_html("<p>Body</p>");

        assert_eq!(mail.subject, "Hello");
        assert!(mail.html_body.is_some());
        assert!(!mail.id.is_empty());
    }
}

//! Mail transports
//!
//! A transport takes a fully assembled [`OutgoingMessage`] and hands it off.
//! Attachments are carried as raw bytes and encoded as base64 MIME parts by
//! the SMTP transport.

use crate::contact::Contact;
use crate::error::{NotifyError, Result};
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, MultiPart, SinglePart};
use lettre::{Message, SmtpTransport, Transport};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// Status returned by the transport, e.g. `("250", "OK queued")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryStatus {
    pub code: String,
    pub message: String,
}

/// A report file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    /// File name shown to the recipient
    pub name: String,
    /// Where the bytes were read from
    pub source: PathBuf,
    pub content: Vec<u8>,
}

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub from: Contact,
    pub to: Vec<Contact>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<MailAttachment>,
}

impl OutgoingMessage {
    pub fn is_addressed_to(&self, email: &str) -> bool {
        self.to
            .iter()
            .any(|contact| contact.email().eq_ignore_ascii_case(email))
    }

    /// Assemble the MIME message: a text part followed by one base64 part per attachment.
    pub fn to_mime(&self) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.mailbox().clone())
            .subject(self.subject.clone());
        for recipient in &self.to {
            builder = builder.to(recipient.mailbox().clone());
        }

        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(self.body.clone()));
        for attachment in &self.attachments {
            let body = Body::new_with_encoding(attachment.content.clone(), ContentTransferEncoding::Base64)
                .map_err(|_| NotifyError::Build(format!("cannot encode {}", attachment.name)))?;
            let content_type = ContentType::parse("application/octet-stream")
                .map_err(|e| NotifyError::Build(e.to_string()))?;
            parts = parts.singlepart(Attachment::new(attachment.name.clone()).body(body, content_type));
        }

        Ok(builder.multipart(parts)?)
    }
}

/// Pluggable delivery backend.
pub trait MailTransport {
    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryStatus>;

    fn name(&self) -> &'static str;
}

impl<T: MailTransport + ?Sized> MailTransport for Arc<T> {
    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryStatus> {
        (**self).deliver(message)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Unauthenticated SMTP to a local submission agent.
pub struct SmtpRelay {
    transport: SmtpTransport,
    host: String,
}

impl SmtpRelay {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            transport: SmtpTransport::builder_dangerous(host).port(port).build(),
            host: host.to_string(),
        }
    }
}

impl MailTransport for SmtpRelay {
    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryStatus> {
        let mime = message.to_mime()?;
        let response = self.transport.send(&mime)?;
        Ok(DeliveryStatus {
            code: response.code().to_string(),
            message: response.message().collect::<Vec<_>>().join(" "),
        })
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

impl std::fmt::Debug for SmtpRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpRelay").field("host", &self.host).finish()
    }
}

/// Logs the message and reports success without sending anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunTransport;

impl MailTransport for DryRunTransport {
    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryStatus> {
        let recipients: Vec<String> = message.to.iter().map(Contact::to_string).collect();
        info!(
            to = %recipients.join(", "),
            subject = %message.subject,
            attachments = message.attachments.len(),
            "Dry run: message not sent"
        );
        Ok(DeliveryStatus {
            code: "250".to_string(),
            message: "dry run: message not sent".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

/// Records every message; optionally fails every delivery.
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    sent: Mutex<Vec<OutgoingMessage>>,
    fail_with: Option<String>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outbox whose deliveries all fail with a transport error.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(reason.into()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MailTransport for MemoryOutbox {
    fn deliver(&self, message: &OutgoingMessage) -> Result<DeliveryStatus> {
        if let Some(reason) = &self.fail_with {
            return Err(NotifyError::Transport(reason.clone()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        Ok(DeliveryStatus {
            code: "250".to_string(),
            message: "stored in memory".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> OutgoingMessage {
        OutgoingMessage {
            from: "watcher@example.org".parse().unwrap(),
            to: vec![
                "Owner <owner@example.org>".parse().unwrap(),
                "Admin <admin@example.org>".parse().unwrap(),
            ],
            subject: "Automated report".to_string(),
            body: "Dear Owner,\n\nAll good.\n".to_string(),
            attachments: vec![MailAttachment {
                name: "run1_REPORT_2014-05-13.txt".to_string(),
                source: PathBuf::from("/reports/run1_REPORT_2014-05-13.log"),
                content: b"line 1\nline 2 INVALID\n".to_vec(),
            }],
        }
    }

    #[test]
    fn mime_message_carries_base64_attachment() {
        let formatted = String::from_utf8(message().to_mime().unwrap().formatted()).unwrap();
        assert!(formatted.contains("Subject: Automated report"));
        assert!(formatted.contains("owner@example.org"));
        assert!(formatted.contains("admin@example.org"));
        assert!(formatted.contains("Content-Transfer-Encoding: base64"));
        assert!(formatted.contains("run1_REPORT_2014-05-13.txt"));
    }

    #[test]
    fn dry_run_reports_success() {
        let status = DryRunTransport.deliver(&message()).unwrap();
        assert_eq!(status.code, "250");
    }

    #[test]
    fn memory_outbox_records_and_fails_on_demand() {
        let outbox = MemoryOutbox::new();
        outbox.deliver(&message()).unwrap();
        assert_eq!(outbox.sent().len(), 1);
        assert!(outbox.sent()[0].is_addressed_to("OWNER@example.org"));

        let failing = MemoryOutbox::failing("connection refused");
        let err = failing.deliver(&message()).unwrap_err();
        assert!(matches!(err, NotifyError::Transport(_)));
        assert!(failing.sent().is_empty());
    }
}

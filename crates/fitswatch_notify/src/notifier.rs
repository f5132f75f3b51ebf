//! Addressing and delivery of composed messages.

use crate::contact::Contact;
use crate::error::{NotifyError, Result};
use crate::templates::Composed;
use crate::transport::{DeliveryStatus, MailAttachment, MailTransport, OutgoingMessage};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Sends owner reports and administrator alerts.
///
/// Administrators receive a copy of everything: they are appended to every
/// owner recipient list and are the sole recipients of alerts.
pub struct Notifier {
    sender: Contact,
    administrators: Vec<Contact>,
    transport: Box<dyn MailTransport>,
}

impl Notifier {
    pub fn new(
        sender: Contact,
        administrators: Vec<Contact>,
        transport: Box<dyn MailTransport>,
    ) -> Self {
        Self {
            sender,
            administrators,
            transport,
        }
    }

    pub fn administrators(&self) -> &[Contact] {
        &self.administrators
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Send to `recipients` plus the administrators.
    pub fn send(
        &self,
        recipients: &[Contact],
        subject: &str,
        body: &str,
        attachments: &[PathBuf],
    ) -> Result<DeliveryStatus> {
        let mut to = Vec::with_capacity(recipients.len() + self.administrators.len());
        let mut seen = HashSet::new();
        for contact in recipients.iter().chain(self.administrators.iter()) {
            if seen.insert(contact.email().to_lowercase()) {
                to.push(contact.clone());
            }
        }
        if to.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        let message = OutgoingMessage {
            from: self.sender.clone(),
            to,
            subject: subject.to_string(),
            body: body.to_string(),
            attachments: read_attachments(attachments),
        };
        let status = self.transport.deliver(&message)?;
        info!(
            transport = self.transport.name(),
            subject = %subject,
            recipients = message.to.len(),
            code = %status.code,
            response = %status.message,
            "Sent notification"
        );
        Ok(status)
    }

    pub fn send_composed(
        &self,
        recipients: &[Contact],
        composed: &Composed,
        attachments: &[PathBuf],
    ) -> Result<DeliveryStatus> {
        self.send(recipients, &composed.subject, &composed.body, attachments)
    }

    /// Administrator-only alert.
    pub fn alert_administrators(
        &self,
        composed: &Composed,
        attachments: &[PathBuf],
    ) -> Result<DeliveryStatus> {
        self.send(&[], &composed.subject, &composed.body, attachments)
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("sender", &self.sender)
            .field("administrators", &self.administrators)
            .field("transport", &self.transport.name())
            .finish()
    }
}

/// Read attachment files, skipping any that cannot be read.
fn read_attachments(paths: &[PathBuf]) -> Vec<MailAttachment> {
    paths
        .iter()
        .filter_map(|path| match std::fs::read(path) {
            Ok(content) => Some(MailAttachment {
                name: attachment_name(path),
                source: path.clone(),
                content,
            }),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Skipping unreadable attachment");
                None
            }
        })
        .collect()
}

/// Attachments are named after the report's base name with a `.txt` extension
/// so mail clients open them inline.
fn attachment_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    format!("{stem}.txt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryOutbox;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn contact(s: &str) -> Contact {
        s.parse().unwrap()
    }

    fn notifier(outbox: Arc<MemoryOutbox>) -> Notifier {
        Notifier::new(
            contact("watcher@example.org"),
            vec![contact("Admin <admin@example.org>")],
            Box::new(outbox),
        )
    }

    #[test]
    fn owners_then_administrators() {
        let outbox = Arc::new(MemoryOutbox::new());
        let notifier = notifier(outbox.clone());

        notifier
            .send(&[contact("Owner <owner@example.org>")], "s", "b", &[])
            .unwrap();

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        let emails: Vec<String> = sent[0].to.iter().map(Contact::email).collect();
        assert_eq!(emails, vec!["owner@example.org", "admin@example.org"]);
    }

    #[test]
    fn administrator_listed_as_owner_is_not_duplicated() {
        let outbox = Arc::new(MemoryOutbox::new());
        let notifier = notifier(outbox.clone());

        notifier
            .send(&[contact("ADMIN@example.org")], "s", "b", &[])
            .unwrap();
        assert_eq!(outbox.sent()[0].to.len(), 1);
    }

    #[test]
    fn alert_goes_to_administrators_only() {
        let outbox = Arc::new(MemoryOutbox::new());
        let notifier = notifier(outbox.clone());

        let composed = Composed {
            subject: "Error".to_string(),
            body: "boom".to_string(),
        };
        notifier.alert_administrators(&composed, &[]).unwrap();

        let sent = outbox.sent();
        assert_eq!(sent[0].to.len(), 1);
        assert!(sent[0].is_addressed_to("admin@example.org"));
    }

    #[test]
    fn no_recipients_is_an_error() {
        let notifier = Notifier::new(
            contact("watcher@example.org"),
            Vec::new(),
            Box::new(MemoryOutbox::new()),
        );
        let err = notifier.send(&[], "s", "b", &[]).unwrap_err();
        assert!(matches!(err, NotifyError::NoRecipients));
    }

    #[test]
    fn attachments_are_read_and_renamed() {
        let temp = TempDir::new().unwrap();
        let report = temp.path().join("run1_REPORT_2014-05-13.log");
        std::fs::write(&report, "INVALID\n").unwrap();
        let missing = temp.path().join("missing.log");

        let outbox = Arc::new(MemoryOutbox::new());
        notifier(outbox.clone())
            .send(&[], "s", "b", &[report.clone(), missing])
            .unwrap();

        let attachments = &outbox.sent()[0].attachments;
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].name, "run1_REPORT_2014-05-13.txt");
        assert_eq!(attachments[0].source, report);
        assert_eq!(attachments[0].content, b"INVALID\n");
    }
}

//! fitswatch Notify - Owner Reports and Administrator Alerts
//!
//! Turns cycle findings into mail: a templated owner report with the
//! checker's report files attached, or a short administrator-only alert when
//! the checker itself misbehaves. Delivery goes through a [`MailTransport`]:
//! SMTP to the local submission agent, a dry-run transport for staging, or an
//! in-memory outbox for tests.

pub mod contact;
pub mod error;
pub mod notifier;
pub mod templates;
pub mod transport;

pub use contact::Contact;
pub use error::{NotifyError, Result};
pub use notifier::Notifier;
pub use templates::{Composed, OwnerReport};
pub use transport::{
    DeliveryStatus, DryRunTransport, MailAttachment, MailTransport, MemoryOutbox,
    OutgoingMessage, SmtpRelay,
};

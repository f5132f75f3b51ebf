//! Notification targets written as `Name <email>`.

use crate::error::NotifyError;
use lettre::message::Mailbox;
use lettre::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A person who receives reports or alerts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Contact {
    mailbox: Mailbox,
}

impl Contact {
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    /// Bare `user@domain` address.
    pub fn email(&self) -> String {
        self.mailbox.email.to_string()
    }

    /// Display name, falling back to the address's user part.
    pub fn display_name(&self) -> String {
        match &self.mailbox.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => self.mailbox.email.user().to_string(),
        }
    }
}

impl FromStr for Contact {
    type Err = NotifyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        // Split `Name <email>` by hand so display names with dots or commas
        // do not have to satisfy RFC 5322 phrase syntax
        let (name, address) = match (trimmed.rfind('<'), trimmed.ends_with('>')) {
            (Some(open), true) => {
                let name = trimmed[..open].trim().trim_matches('"').trim();
                let address = &trimmed[open + 1..trimmed.len() - 1];
                ((!name.is_empty()).then(|| name.to_string()), address.trim())
            }
            _ => (None, trimmed),
        };
        let email = address
            .parse::<Address>()
            .map_err(|source| NotifyError::Address {
                input: input.to_string(),
                source,
            })?;
        Ok(Self {
            mailbox: Mailbox::new(name, email),
        })
    }
}

impl TryFrom<String> for Contact {
    type Error = NotifyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Contact> for String {
    fn from(contact: Contact) -> Self {
        contact.to_string()
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mailbox.name {
            Some(name) => write!(f, "{} <{}>", name, self.mailbox.email),
            None => write!(f, "{}", self.mailbox.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_bare_addresses() {
        let named: Contact = "A. Casey <andy@example.org>".parse().unwrap();
        assert_eq!(named.display_name(), "A. Casey");
        assert_eq!(named.email(), "andy@example.org");
        assert_eq!(named.to_string(), "A. Casey <andy@example.org>");

        let bare: Contact = "watcher@example.org".parse().unwrap();
        assert_eq!(bare.display_name(), "watcher");
        assert_eq!(bare.to_string(), "watcher@example.org");
    }

    #[test]
    fn rejects_garbage() {
        let err = "not an address".parse::<Contact>().unwrap_err();
        assert!(matches!(err, NotifyError::Address { .. }));
    }

    #[test]
    fn deserializes_from_string_list() {
        #[derive(Deserialize)]
        struct Owners {
            owners: Vec<Contact>,
        }
        let parsed: Owners =
            toml::from_str(r#"owners = ["Clare <clare@example.org>", "ops@example.org"]"#).unwrap();
        assert_eq!(parsed.owners.len(), 2);
        assert_eq!(parsed.owners[0].display_name(), "Clare");
    }
}

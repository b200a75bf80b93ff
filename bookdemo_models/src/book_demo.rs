use std::{ops::Deref, str::FromStr, sync::LazyLock};

use nutype::nutype;
use regex::Regex;
use thiserror::Error;

use crate::email_address::EmailAddress;

/// A validated demo request as entered in the "book a demo" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoRequest {
    pub first_name: DemoRequestFirstName,
    pub last_name: DemoRequestLastName,
    pub company: DemoRequestCompany,
    pub email: DemoRequestEmail,
    pub message: DemoRequestMessage,
}

/// A validated demo request together with the value of the hidden honeypot
/// field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoRequestSubmission {
    pub request: DemoRequest,
    pub honeypot: String,
}

impl DemoRequestSubmission {
    /// Whether the honeypot field has been filled in. Humans never see the
    /// field, so any content (including whitespace) marks a bot.
    pub fn is_spam(&self) -> bool {
        !self.honeypot.is_empty()
    }
}

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 256),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize)
)]
pub struct DemoRequestFirstName(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 256),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize)
)]
pub struct DemoRequestLastName(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 256),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize)
)]
pub struct DemoRequestCompany(String);

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 4096),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize)
)]
pub struct DemoRequestMessage(String);

impl DemoRequestFirstName {
    pub const MAX_LENGTH: usize = 256;
}

impl DemoRequestLastName {
    pub const MAX_LENGTH: usize = 256;
}

impl DemoRequestCompany {
    pub const MAX_LENGTH: usize = 256;
}

impl DemoRequestMessage {
    pub const MAX_LENGTH: usize = 4096;
}

/// Requires a `local@domain.tld` shape on top of the RFC rules enforced by
/// [`EmailAddress`], which would otherwise accept dotless domains.
pub static DEMO_REQUEST_EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Email address of the person requesting a demo. Used as the reply-to
/// address of the notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoRequestEmail(EmailAddress);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid email")]
pub struct DemoRequestEmailError;

impl FromStr for DemoRequestEmail {
    type Err = DemoRequestEmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !DEMO_REQUEST_EMAIL_REGEX.is_match(s) {
            return Err(DemoRequestEmailError);
        }
        s.parse().map(Self).map_err(|_| DemoRequestEmailError)
    }
}

impl TryFrom<&str> for DemoRequestEmail {
    type Error = DemoRequestEmailError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Deref for DemoRequestEmail {
    type Target = EmailAddress;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DemoRequestEmail> for EmailAddress {
    fn from(value: DemoRequestEmail) -> Self {
        value.0
    }
}

impl std::fmt::Display for DemoRequestEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        let name = DemoRequestFirstName::try_new("  Jane \n").unwrap();
        assert_eq!(*name, "Jane");
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(DemoRequestLastName::try_new("").is_err());
        assert!(DemoRequestLastName::try_new(" \t ").is_err());
    }

    #[test]
    fn message_length_is_limited() {
        let max = "x".repeat(DemoRequestMessage::MAX_LENGTH);
        assert!(DemoRequestMessage::try_new(max.clone()).is_ok());
        assert!(DemoRequestMessage::try_new(max + "x").is_err());
    }

    #[test]
    fn email_shape() {
        for (input, ok) in [
            ("jane@acme.com", true),
            ("  jane@acme.com ", true),
            ("jane.doe+demo@sub.acme.co.uk", true),
            ("bad", false),
            ("", false),
            ("jane@acme", false),
            ("@acme.com", false),
            ("jane@@acme.com", false),
            ("jane doe@acme.com", false),
        ] {
            assert_eq!(input.parse::<DemoRequestEmail>().is_ok(), ok, "{input:?}");
        }
    }

    #[test]
    fn email_is_trimmed() {
        let email = " jane@acme.com ".parse::<DemoRequestEmail>().unwrap();
        assert_eq!(email.as_str(), "jane@acme.com");
    }

    #[test]
    fn spam() {
        let request = DemoRequest {
            first_name: "Jane".try_into().unwrap(),
            last_name: "Doe".try_into().unwrap(),
            company: "Acme".try_into().unwrap(),
            email: "jane@acme.com".parse().unwrap(),
            message: "Hi".try_into().unwrap(),
        };

        let mut submission = DemoRequestSubmission {
            request,
            honeypot: String::new(),
        };
        assert!(!submission.is_spam());

        submission.honeypot = "http://spam.example".into();
        assert!(submission.is_spam());

        submission.honeypot = " ".into();
        assert!(submission.is_spam());
    }
}

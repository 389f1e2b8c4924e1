//! Field validation failures collected across a whole payload.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use super::Error;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^\w+([.+-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,})+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Return `true` for a plausible e-mail address.
pub fn is_valid_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Return `true` for an absolute `http` or `https` URL with a host.
pub fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
}

/// Accumulated validation messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    messages: Vec<String>,
}

impl ValidationErrors {
    /// Start an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Record `message` when `failed` holds.
    pub fn check(&mut self, failed: bool, message: &str) {
        if failed {
            self.push(message);
        }
    }

    /// Messages recorded so far.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// `Ok(())` when nothing failed, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Self::invalid_request(value.to_string())
    }
}

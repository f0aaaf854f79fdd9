// src/contact.rs

//! Contact form handling on top of a [`WindowLimiter`].
//!
//! Input is sanitized as it is typed, validated on submit, screened with a
//! honeypot field and finally delivered through a [`ContactSink`] under the
//! limiter's control (3 submissions per minute by default).

// dependencies
use crate::clock::{Clock, MonotonicClock};
use crate::config::WindowLimiterConfig;
use crate::errors::{ContactError, Result};
use crate::window_limiter::WindowLimiter;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};

const MAX_FIELD_CHARS: usize = 1_000;
const MAX_MESSAGE_CHARS: usize = 2_000;
const MIN_NAME_CHARS: usize = 2;
const MIN_MESSAGE_CHARS: usize = 10;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| match Regex::new(EMAIL_PATTERN) {
    Ok(re) => Some(re),
    Err(e) => {
        warn!(pattern = EMAIL_PATTERN, error = %e, "Invalid email pattern");
        None
    }
});

pub const SUCCESS_MESSAGE: &str = "Thank you for your message";
pub const DELIVERY_FAILED_MESSAGE: &str =
    "An error occurred. Please try again or contact us directly at support@softhe.io";

/// Strip angle brackets and cap the length of a typed value.
pub fn sanitize_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(MAX_FIELD_CHARS)
        .collect()
}

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

/// The fields a visitor fills in on the contact page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    #[serde(default)]
    pub hardware: String,
    pub message: String,
}

impl ContactForm {
    /// Copy of the form with every field passed through [`sanitize_input`].
    pub fn sanitized(&self) -> Self {
        Self {
            name: sanitize_input(&self.name),
            email: sanitize_input(&self.email),
            subject: sanitize_input(&self.subject),
            hardware: sanitize_input(&self.hardware),
            message: sanitize_input(&self.message),
        }
    }

    /// Check the fields in display order; the first failure wins.
    pub fn validate(&self) -> std::result::Result<(), ContactError> {
        if self.name.trim().chars().count() < MIN_NAME_CHARS {
            return Err(ContactError::InvalidName);
        }
        if !is_valid_email(&self.email) {
            return Err(ContactError::InvalidEmail);
        }
        if self.subject.is_empty() {
            return Err(ContactError::MissingSubject);
        }
        if self.message.trim().chars().count() < MIN_MESSAGE_CHARS {
            return Err(ContactError::MessageTooShort);
        }
        if self.message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ContactError::MessageTooLong);
        }
        Ok(())
    }
}

/// Where accepted messages go (a mail relay, a form service, a queue).
#[async_trait]
pub trait ContactSink: Send + Sync {
    async fn deliver(&self, form: &ContactForm) -> std::result::Result<(), ContactError>;
}

/// What the page shows after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStatus {
    Success(String),
    Error(String),
    /// Honeypot tripped: nothing is shown and nothing is sent.
    Ignored,
}

/// Rate-limited contact form endpoint for one visitor session.
#[derive(Debug)]
pub struct ContactDesk<S, C = MonotonicClock>
where
    S: ContactSink,
    C: Clock + 'static,
{
    sink: S,
    limiter: WindowLimiter<C>,
}

impl<S, C> ContactDesk<S, C>
where
    S: ContactSink,
    C: Clock + 'static,
{
    pub fn new(sink: S, clock: C) -> Result<Self> {
        Self::with_config(sink, WindowLimiterConfig::default(), clock)
    }

    pub fn with_config(sink: S, config: WindowLimiterConfig, clock: C) -> Result<Self> {
        Ok(Self {
            sink,
            limiter: WindowLimiter::with_config(config, clock)?,
        })
    }

    pub fn limiter(&self) -> &WindowLimiter<C> {
        &self.limiter
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Submit a form. `honeypot` is the hidden field's value; bots fill it in.
    pub async fn submit(&self, form: &ContactForm, honeypot: &str) -> SubmitStatus {
        if !honeypot.is_empty() {
            warn!("Bot detected via honeypot");
            return SubmitStatus::Ignored;
        }

        let form = form.sanitized();
        if let Err(e) = form.validate() {
            debug!(error = %e, "Contact form rejected");
            return SubmitStatus::Error(e.to_string());
        }

        let sink = &self.sink;
        let form = &form;
        match self.limiter.attempt(move || sink.deliver(form)).await {
            Ok(true) => SubmitStatus::Success(SUCCESS_MESSAGE.to_string()),
            Ok(false) => SubmitStatus::Error(self.limiter.block_message()),
            Err(e) => {
                warn!(error = %e, "Contact form delivery failed");
                SubmitStatus::Error(DELIVERY_FAILED_MESSAGE.to_string())
            }
        }
    }
}

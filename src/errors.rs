// src/errors.rs

// error handling for the window limiter and its collaborators

// dependencies
use thiserror::Error;

/// Error type for WindowLimiter configuration issues.
///
/// Deciding whether an attempt is allowed never fails; these errors only come
/// out of building or loading a configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WindowLimiterError {
    /// limit == 0
    #[error("Limit must be positive")]
    InvalidLimit,

    /// window_ms == 0
    #[error("Window must be positive")]
    InvalidWindow,

    /// Configuration text could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// FAQ catalog JSON could not be parsed
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for window limiter operations.
pub type Result<T> = std::result::Result<T, WindowLimiterError>;

/// Errors raised while validating or delivering a contact form.
/// The display text is the message shown to the visitor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Please enter a valid name")]
    InvalidName,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please select a subject")]
    MissingSubject,

    #[error("Please enter a message")]
    MessageTooShort,

    #[error("Message is too long (maximum 2000 characters).")]
    MessageTooLong,

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

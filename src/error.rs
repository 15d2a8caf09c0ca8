//! Error types for wcmp
//!
//! This module defines all error types used throughout the library.
//! Parsing and schema failures are caller-visible; field extraction and
//! link checking degrade to absent values instead of raising.

use std::fmt;
use thiserror::Error;

/// Result type alias using wcmp Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wcmp operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema validation error
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// XML parsing error (malformed input)
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Root element is not a WCMP metadata record
    #[error("not a recognized document: {0}")]
    NotRecognized(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Value error (invalid value for an operation)
    #[error("value error: {0}")]
    Value(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Low-level XML error with the underlying diagnostic
    #[error("XML error: {0}")]
    Xml(String),
}

/// Schema validation error with context
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Error message
    pub message: String,
    /// Path to the element that failed validation
    pub path: Option<String>,
    /// Underlying reason
    pub reason: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            reason: None,
        }
    }

    /// Set the path where validation failed
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the reason
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref reason) = self.reason {
            write!(f, "\n\nReason: {}", reason)?;
        }

        if let Some(ref path) = self.path {
            write!(f, "\n\nPath: {}", path)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// XML parsing error
///
/// The original parser diagnostic is logged, not carried here; callers
/// only see the classification.
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the source, when known
    pub location: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, " (at {})", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

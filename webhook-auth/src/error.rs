//! Error types for the `webhook-auth` crate.
//!
//! Follows the root Error struct plus error kind enums pattern used across the workspace.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for webhook-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in webhook-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The receiving side is misconfigured; the sender did nothing wrong.
    Configuration(ConfigErrorKind),
    /// The delivery itself failed authentication or decoding.
    Webhook(WebhookErrorKind),
}

/// Errors from verifier configuration.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    MissingSecret,
}

/// Errors from webhook validation.
#[derive(Debug, PartialEq)]
pub enum WebhookErrorKind {
    MissingSignature,
    MalformedHeader,
    SignatureMismatch,
    TimestampOutOfRange,
    MalformedBody,
}

impl Error {
    /// Returns true when the caller sent a bad request, false when we are misconfigured.
    pub fn is_client_fault(&self) -> bool {
        matches!(self.error_kind, ErrorKind::Webhook(_))
    }

    /// Short diagnostic suitable for a response body. Never carries key material.
    pub fn reason(&self) -> &'static str {
        match &self.error_kind {
            ErrorKind::Configuration(ConfigErrorKind::MissingSecret) => {
                "webhook signing secret is not configured"
            }
            ErrorKind::Webhook(kind) => match kind {
                WebhookErrorKind::MissingSignature => "webhook has no Stripe-Signature header",
                WebhookErrorKind::MalformedHeader => "webhook has invalid Stripe-Signature header",
                WebhookErrorKind::SignatureMismatch => "webhook had no valid signature",
                WebhookErrorKind::TimestampOutOfRange => "timestamp wasn't within tolerance",
                WebhookErrorKind::MalformedBody => "failed to parse webhook body json",
            },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Configuration(kind) => write!(f, "Configuration error: {:?}", kind),
            ErrorKind::Webhook(kind) => write!(f, "Webhook error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Webhook(WebhookErrorKind::MalformedBody),
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Configuration(kind),
    }
}

/// Helper function to create webhook errors.
pub fn webhook_error(kind: WebhookErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Webhook(kind),
    }
}

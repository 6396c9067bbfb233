//! Webhook signature validation.

mod stripe;

pub use stripe::{
    compute_signature, construct_event, signature_header, StripeSignatureVerifier,
    SIGNATURE_HEADER,
};

use std::time::Duration;

use http::HeaderMap;

use crate::error::{webhook_error, Error, WebhookErrorKind};
use crate::event::Event;

/// Default window within which a signature timestamp is accepted.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

/// Trait for validating webhook deliveries.
pub trait WebhookValidator: Send + Sync {
    /// Validate a webhook request and decode its event.
    ///
    /// # Arguments
    ///
    /// * `headers` - HTTP headers from the webhook request
    /// * `body` - Raw request body bytes, exactly as received
    fn validate(&self, headers: &HeaderMap, body: &[u8]) -> Result<Event, Error>;

    /// Get the provider identifier for this validator.
    fn provider_id(&self) -> &str;
}

/// Replay protection policy for signature timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tolerance {
    /// Reject signatures whose timestamp is further than this from the current time.
    Enforced(Duration),
    /// Accept any timestamp. Only meant for replaying captured fixtures.
    Ignored,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Enforced(DEFAULT_TOLERANCE)
    }
}

/// Parsed `Stripe-Signature` header.
///
/// The wire format is a comma-separated list of `key=value` pairs:
///
/// ```text
/// t=1492774577,v1=5257a869e7ecebeda32affa62cdca3fa51cad7e77a0e56ff536d0ce8e108d8bd,v0=6ffbb59b...
/// ```
///
/// `v1` may repeat while a secret is being rolled. `v0` and unknown keys are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

impl SignatureHeader {
    /// Parse a raw header value.
    pub fn parse(value: &str) -> Result<Self, Error> {
        if value.trim().is_empty() {
            return Err(webhook_error(
                WebhookErrorKind::MissingSignature,
                "Stripe-Signature header is empty",
            ));
        }

        let mut timestamp = None;
        let mut signatures = Vec::new();

        for item in value.split(',') {
            let (key, val) = item.trim().split_once('=').ok_or_else(|| {
                webhook_error(
                    WebhookErrorKind::MalformedHeader,
                    "header item is not a key=value pair",
                )
            })?;

            match key {
                "t" => {
                    let parsed = val.parse::<i64>().map_err(|_| {
                        webhook_error(
                            WebhookErrorKind::MalformedHeader,
                            "timestamp is not a decimal integer",
                        )
                    })?;
                    timestamp = Some(parsed);
                }
                "v1" => signatures.push(val.to_string()),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| {
            webhook_error(WebhookErrorKind::MalformedHeader, "header has no timestamp")
        })?;

        if signatures.is_empty() {
            return Err(webhook_error(
                WebhookErrorKind::MalformedHeader,
                "header has no v1 signature",
            ));
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }

    /// Signing timestamp in seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Every `v1` value, in header order.
    pub fn signatures(&self) -> &[String] {
        &self.signatures
    }
}

//! HMAC-SHA256 verification of Stripe webhook signatures.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http::HeaderMap;
use log::*;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use super::{SignatureHeader, Tolerance, WebhookValidator};
use crate::error::{config_error, webhook_error, ConfigErrorKind, Error, WebhookErrorKind};
use crate::event::Event;

type HmacSha256 = Hmac<Sha256>;

/// Name of the header Stripe puts the signature in.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Builds the MAC over `"<timestamp>.<payload>"`.
fn signed_payload_mac(timestamp: i64, payload: &[u8], secret: &str) -> Result<HmacSha256, Error> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| config_error(ConfigErrorKind::MissingSecret, "Invalid HMAC key"))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Computes the lowercase hex `v1` signature Stripe would send for this payload.
pub fn compute_signature(timestamp: i64, payload: &[u8], secret: &str) -> Result<String, Error> {
    let mac = signed_payload_mac(timestamp, payload, secret)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Produces a complete `Stripe-Signature` header value (`t=...,v1=...`).
pub fn signature_header(timestamp: i64, payload: &[u8], secret: &str) -> Result<String, Error> {
    let signature = compute_signature(timestamp, payload, secret)?;
    Ok(format!("t={timestamp},v1={signature}"))
}

/// Verifies payloads signed with a single endpoint secret.
///
/// Holds no mutable state, so one instance can be shared by every request.
#[derive(Debug)]
pub struct StripeSignatureVerifier {
    secret: SecretString,
    tolerance: Tolerance,
}

impl StripeSignatureVerifier {
    /// Create a new verifier.
    ///
    /// # Arguments
    ///
    /// * `secret` - Endpoint signing secret (`whsec_...`)
    /// * `tolerance` - Replay window applied to the header timestamp
    pub fn new(secret: String, tolerance: Tolerance) -> Self {
        Self {
            secret: SecretString::new(secret),
            tolerance,
        }
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Verify `header` against `payload` and decode the event, using the current time.
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<Event, Error> {
        self.verify_at(payload, header, Utc::now())
    }

    /// Verify as of `now`.
    pub fn verify_at(
        &self,
        payload: &[u8],
        header: &str,
        now: DateTime<Utc>,
    ) -> Result<Event, Error> {
        let secret = self.secret.expose_secret();
        if secret.is_empty() {
            return Err(config_error(
                ConfigErrorKind::MissingSecret,
                "signing secret is empty",
            ));
        }

        let header = SignatureHeader::parse(header)?;
        let expected = signed_payload_mac(header.timestamp(), payload, secret)?;

        // Every v1 is checked; during a secret roll Stripe signs with both secrets.
        let matched = header.signatures().iter().any(|candidate| match hex::decode(candidate) {
            Ok(bytes) => expected.clone().verify_slice(&bytes).is_ok(),
            Err(_) => false,
        });

        if !matched {
            return Err(webhook_error(
                WebhookErrorKind::SignatureMismatch,
                "no v1 signature matched the expected signature",
            ));
        }

        if let Tolerance::Enforced(window) = self.tolerance {
            let drift = now.timestamp().saturating_sub(header.timestamp()).unsigned_abs();
            if drift > window.as_secs() {
                debug!(
                    "Signature timestamp {} is {}s away from now, tolerance is {}s",
                    header.timestamp(),
                    drift,
                    window.as_secs()
                );
                return Err(webhook_error(
                    WebhookErrorKind::TimestampOutOfRange,
                    "signature timestamp is outside the tolerance window",
                ));
            }
        }

        let event = Event::from_slice(payload)?;
        trace!("Verified Stripe event {} ({})", event.id, event.event_type);
        Ok(event)
    }
}

impl WebhookValidator for StripeSignatureVerifier {
    fn validate(&self, headers: &HeaderMap, body: &[u8]) -> Result<Event, Error> {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .ok_or_else(|| {
                webhook_error(
                    WebhookErrorKind::MissingSignature,
                    &format!("Missing signature header: {}", SIGNATURE_HEADER),
                )
            })?
            .to_str()
            .map_err(|_| {
                webhook_error(
                    WebhookErrorKind::MalformedHeader,
                    "signature header is not visible ASCII",
                )
            })?;

        self.verify(body, signature)
    }

    fn provider_id(&self) -> &str {
        "stripe"
    }
}

/// One-shot verification without building a verifier first.
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance: Tolerance,
) -> Result<Event, Error> {
    StripeSignatureVerifier::new(secret.to_string(), tolerance).verify(payload, header)
}

//! # webhook-auth
//!
//! Authentication of inbound Stripe webhook deliveries:
//! - `Stripe-Signature` header parsing (`t=...,v1=...,v0=...`)
//! - HMAC-SHA256 over `"<timestamp>.<raw body>"` with constant-time comparison
//! - Replay protection through a configurable timestamp tolerance
//! - Decoding of the verified body into an [`Event`]
//!
//! Everything here is pure computation over request data; the HTTP gate that
//! calls into it lives in the `web` crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use webhook_auth::webhook::{StripeSignatureVerifier, Tolerance};
//!
//! let verifier = StripeSignatureVerifier::new(secret, Tolerance::default());
//! let event = verifier.verify(&body, signature_header)?;
//! ```

pub mod error;
pub mod event;
pub mod webhook;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
pub use event::Event;

//! Gate that authenticates Stripe webhook deliveries before they reach a handler.
//!
//! Per request the gate either passes the request through untouched (skip
//! predicate), fails with 500 (no signing secret configured), fails with 400
//! (delivery did not verify), or attaches a [`StripeEvent`] to the request
//! extensions and continues the pipeline.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::*;
use service::config::{Config, DEFAULT_MAX_BODY_BYTES};
use webhook_auth::error::{config_error, webhook_error, ConfigErrorKind, WebhookErrorKind};
use webhook_auth::webhook::{StripeSignatureVerifier, Tolerance, WebhookValidator};

use crate::error::Error;
use crate::extractors::stripe_event::StripeEvent;

/// Environment variable consulted by [`GateConfig::from_env`].
pub const SIGNING_SECRET_ENV: &str = "STRIPE_WEBHOOK_SIGNING_SECRET";

/// Lets callers opt individual requests out of verification.
pub trait SkipPredicate: Send + Sync {
    fn should_skip(&self, request: &Request) -> bool;
}

impl<F> SkipPredicate for F
where
    F: Fn(&Request) -> bool + Send + Sync,
{
    fn should_skip(&self, request: &Request) -> bool {
        self(request)
    }
}

/// Gate configuration, resolved once before the gate is built.
#[derive(Clone)]
pub struct GateConfig {
    signing_secret: String,
    skip: Option<Arc<dyn SkipPredicate>>,
    tolerance: Tolerance,
    max_body_bytes: usize,
}

impl GateConfig {
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            skip: None,
            tolerance: Tolerance::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Reads the signing secret from `STRIPE_WEBHOOK_SIGNING_SECRET`. A missing
    /// variable yields an empty secret, which the gate answers with 500.
    pub fn from_env() -> Self {
        Self::new(std::env::var(SIGNING_SECRET_ENV).unwrap_or_default())
    }

    pub fn with_skip(mut self, skip: impl SkipPredicate + 'static) -> Self {
        self.skip = Some(Arc::new(skip));
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn has_signing_secret(&self) -> bool {
        !self.signing_secret.is_empty()
    }
}

// The secret must never reach logs.
impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("skip", &self.skip.is_some())
            .field("tolerance", &self.tolerance)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl From<&Config> for GateConfig {
    fn from(config: &Config) -> Self {
        let tolerance = if config.stripe_webhook_ignore_tolerance {
            Tolerance::Ignored
        } else {
            Tolerance::Enforced(Duration::from_secs(config.stripe_webhook_tolerance_secs))
        };

        GateConfig::new(config.stripe_webhook_signing_secret().unwrap_or_default())
            .with_tolerance(tolerance)
            .with_max_body_bytes(config.webhook_max_body_bytes)
    }
}

/// Immutable per-process gate state shared by every request.
pub struct StripeWebhookGate {
    verifier: StripeSignatureVerifier,
    has_secret: bool,
    skip: Option<Arc<dyn SkipPredicate>>,
    max_body_bytes: usize,
}

impl StripeWebhookGate {
    pub fn new(config: GateConfig) -> Self {
        let has_secret = config.has_signing_secret();
        if !has_secret {
            warn!("Stripe webhook signing secret is not set; webhook requests will fail with 500");
        }
        if config.tolerance == Tolerance::Ignored {
            warn!("Stripe webhook timestamp tolerance is disabled; replayed deliveries will be accepted");
        }

        Self {
            verifier: StripeSignatureVerifier::new(config.signing_secret, config.tolerance),
            has_secret,
            skip: config.skip,
            max_body_bytes: config.max_body_bytes,
        }
    }

    fn should_skip(&self, request: &Request) -> bool {
        self.skip
            .as_ref()
            .is_some_and(|skip| skip.should_skip(request))
    }
}

/// Middleware verifying the `Stripe-Signature` of every request routed through it.
///
/// Install with `route_layer(from_fn_with_state(gate, verify_stripe_signature))`.
pub async fn verify_stripe_signature(
    State(gate): State<Arc<StripeWebhookGate>>,
    request: Request,
    next: Next,
) -> Response {
    if gate.should_skip(&request) {
        debug!("Skipping Stripe signature verification for {}", request.uri());
        return next.run(request).await;
    }

    if !gate.has_secret {
        error!("Rejecting Stripe webhook: signing secret is not configured");
        return Error::from(config_error(
            ConfigErrorKind::MissingSecret,
            "signing secret is empty",
        ))
        .into_response();
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match body::to_bytes(body, gate.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Rejecting Stripe webhook: could not read body: {:?}", e);
            return Error::from(webhook_error(
                WebhookErrorKind::MalformedBody,
                "request body could not be read",
            ))
            .into_response();
        }
    };

    match gate.verifier.validate(&parts.headers, &bytes) {
        Ok(event) => {
            info!(
                "Verified Stripe webhook {} of type {}",
                event.id, event.event_type
            );
            parts.extensions.insert(StripeEvent::new(event));
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        Err(e) => {
            warn!("Rejecting Stripe webhook: {}", e.reason());
            Error::from(e).into_response()
        }
    }
}

//! Controller for Stripe webhook deliveries.
//!
//! By the time a request reaches this handler the signature gate has already
//! authenticated it; the handler only acknowledges receipt.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use log::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::extractors::stripe_event::StripeEvent;

/// Response for webhook acknowledgment
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookResponse {
    pub received: bool,
    /// Id of the verified event; absent when verification was skipped for this request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

/// POST /webhooks/stripe
///
/// Receives Stripe events. Authentication happens in the signature gate, not here.
#[utoipa::path(
    post,
    path = "/webhooks/stripe",
    params(
        ("Stripe-Signature" = String, Header, description = "t=<unix time>,v1=<hex HMAC-SHA256>")
    ),
    request_body(content = String, description = "Stripe event JSON, byte-exact as signed", content_type = "application/json"),
    responses(
        (status = 200, description = "Event verified and accepted", body = WebhookResponse),
        (status = 400, description = "Signature, header or body failed verification", body = String),
        (status = 500, description = "Signing secret is not configured", body = String),
    )
)]
pub async fn stripe_webhook(event: Option<StripeEvent>) -> impl IntoResponse {
    let response = match event {
        Some(event) => {
            debug!(
                "Accepted Stripe event {} ({}), livemode: {}",
                event.id, event.event_type, event.livemode
            );
            WebhookResponse {
                received: true,
                id: Some(event.id.clone()),
                event_type: Some(event.event_type.clone()),
            }
        }
        None => {
            debug!("Stripe webhook reached handler without a verified event");
            WebhookResponse {
                received: true,
                id: None,
                event_type: None,
            }
        }
    };

    (StatusCode::OK, Json(response))
}

use crate::extractors::RejectionType;
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{request::Parts, StatusCode},
};
use log::*;
use std::convert::Infallible;
use std::ops::Deref;
use std::sync::Arc;
use webhook_auth::Event;

/// A Stripe event whose signature the gate has verified.
///
/// The gate stores it in the request extensions, keyed by this type, so only
/// requests that went through `verify_stripe_signature` carry one. Handlers
/// read it through this extractor and never mutate it.
#[derive(Clone, Debug)]
pub struct StripeEvent(Arc<Event>);

impl StripeEvent {
    pub(crate) fn new(event: Event) -> Self {
        Self(Arc::new(event))
    }
}

impl Deref for StripeEvent {
    type Target = Event;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for StripeEvent
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    // A handler asking for a verified event on a route without the gate is a wiring bug, not a bad request.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<StripeEvent>() {
            Some(event) => Ok(event.clone()),
            None => {
                error!(
                    "No verified Stripe event on request to {}; is the route behind the signature gate?",
                    parts.uri
                );
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL SERVER ERROR".to_string(),
                ))
            }
        }
    }
}

// Lets handlers on routes with a skip predicate take `Option<StripeEvent>`.
impl<S> OptionalFromRequestParts<S> for StripeEvent
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<StripeEvent>().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn requires_event(event: StripeEvent) -> String {
        event.event_type.clone()
    }

    fn event() -> Event {
        Event::from_slice(br#"{"id":"evt_1","type":"invoice.paid"}"#).unwrap()
    }

    #[tokio::test]
    async fn test_extracts_event_from_extensions() {
        let app = Router::new().route("/", get(requires_event));
        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        request.extensions_mut().insert(StripeEvent::new(event()));

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_event_is_server_error() {
        let app = Router::new().route("/", get(requires_event));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_clones_share_the_event() {
        let original = StripeEvent::new(event());
        let copy = original.clone();
        assert!(Arc::ptr_eq(&original.0, &copy.0));
        assert_eq!(copy.id, "evt_1");
    }
}

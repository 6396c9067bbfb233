use crate::{
    controller::{health_check_controller, webhook_controller},
    middleware::stripe_signature::verify_stripe_signature,
    AppState,
};
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Stripe Webhook Gate API"
        ),
        paths(
            health_check_controller::health_check,
            webhook_controller::stripe_webhook,
        ),
        components(
            schemas(
                webhook_controller::WebhookResponse,
            )
        ),
        tags(
            (name = "stripe_webhook_gate", description = "Signature-verified Stripe webhook receiver")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(stripe_webhook_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

/// Routes for Stripe webhooks (no session authentication - validated by the signature gate)
fn stripe_webhook_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            app_state.config.webhook_path(),
            post(webhook_controller::stripe_webhook),
        )
        .route_layer(from_fn_with_state(
            app_state.gate.clone(),
            verify_stripe_signature,
        ))
        .with_state(app_state)
}

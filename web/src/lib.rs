//! HTTP layer for the Stripe webhook gate: the signature-verifying middleware,
//! the extractor that hands verified events to handlers, and the router.

use std::sync::Arc;

use log::*;
use service::config::Config;
use tokio::net::TcpListener;

use crate::middleware::stripe_signature::StripeWebhookGate;

mod controller;
mod error;
pub mod extractors;
pub mod middleware;
mod router;

pub use error::Error;
pub use router::define_routes;

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gate: Arc<StripeWebhookGate>,
}

impl AppState {
    pub fn new(config: Config, gate: Arc<StripeWebhookGate>) -> Self {
        Self { config, gate }
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let listen_addr = app_state.config.listen_address();
    info!("Server starting... listening for connections on http://{listen_addr}");
    info!(
        "Stripe webhooks accepted on POST {}",
        app_state.config.webhook_path()
    );

    let listener = TcpListener::bind(&listen_addr).await?;
    let router = define_routes(app_state);

    axum::serve(listener, router).await
}

use log::*;
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use web::middleware::stripe_signature::{GateConfig, StripeWebhookGate};
use web::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = get_config();

    Logger::init_logger(&config)?;

    info!("Starting up the Stripe webhook gate...");
    info!("Runtime environment: {}", config.runtime_env());

    if config.stripe_webhook_ignore_tolerance && config.is_production() {
        warn!("Timestamp tolerance is disabled in production; old deliveries can be replayed");
    }

    // Secret, tolerance and body limit are resolved once here and never re-read per request.
    let gate = Arc::new(StripeWebhookGate::new(GateConfig::from(&config)));
    let app_state = AppState::new(config, gate);

    web::init_server(app_state).await?;

    Ok(())
}

fn get_config() -> Config {
    Config::new()
}

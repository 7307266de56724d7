//! Contact relay service entry point.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use contact_relay::adapters::http::{app_router, AppState};
use contact_relay::adapters::stripe::{StripeClient, StripeClientConfig, StripeEventVerifier};
use contact_relay::adapters::wix::{WixContactsDirectory, WixDirectoryConfig};
use contact_relay::adapters::InMemoryProcessedSessionStore;
use contact_relay::application::{ProcessWebhookHandler, ReconcileContactHandler};
use contact_relay::config::AppConfig;
use contact_relay::domain::{EligibilityTargets, NameFieldMatcher};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    let verifier = Arc::new(StripeEventVerifier::new(
        config.payment.webhook_secret.clone(),
    ));
    let session_lookup = Arc::new(StripeClient::new(StripeClientConfig::new(
        config.payment.api_key.clone(),
    )));
    let directory = Arc::new(WixContactsDirectory::new(
        WixDirectoryConfig::new(
            config.directory.api_key.clone(),
            config.directory.site_id.clone(),
        )
        .with_base_url(config.directory.base_url.clone()),
    ));
    let processed_sessions = Arc::new(InMemoryProcessedSessionStore::new());

    let reconciler =
        ReconcileContactHandler::new(directory, config.directory.target_label.clone());
    let pipeline = ProcessWebhookHandler::new(
        verifier,
        session_lookup,
        processed_sessions,
        reconciler,
        EligibilityTargets::from_payment_config(&config.payment),
        NameFieldMatcher::new(
            config.directory.last_name_field_key.clone(),
            config.directory.last_name_field_label.clone(),
        ),
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "Contact relay listening");

    let request_timeout = std::time::Duration::from_secs(config.server.request_timeout_secs);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app_router(state, request_timeout)).await?;

    Ok(())
}

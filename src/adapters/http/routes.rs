//! Axum router configuration for the webhook endpoint.
//!
//! Webhook routes carry no user authentication; the request is
//! authenticated by its signature instead.

use std::time::Duration;

use axum::routing::post;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{handle_payment_webhook, method_not_allowed, AppState};

/// Create the webhook router.
///
/// # Routes
/// - `POST /webhooks/stripe` - Process payment webhooks
///
/// Any other method on the route answers `405` with a JSON error body.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route(
        "/webhooks/stripe",
        post(handle_payment_webhook).fallback(method_not_allowed),
    )
}

/// Create the complete application router with request tracing and an
/// overall request timeout.
///
/// A hung downstream call surfaces to the processor as a delivery failure
/// eligible for its own redelivery; the timeout bounds how long that takes.
pub fn app_router(state: AppState, request_timeout: Duration) -> Router {
    webhook_routes()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

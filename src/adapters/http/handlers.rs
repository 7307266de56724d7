//! HTTP handlers for the webhook endpoint.
//!
//! The handler passes the body through as raw bytes; any decoding before
//! signature verification would invalidate the signature.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use crate::application::{ProcessOutcome, ProcessWebhookCommand, ProcessWebhookHandler};

use super::dto::{ErrorResponse, WebhookAck};

/// Header carrying the processor's signature.
const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Shared application state for the webhook routes.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ProcessWebhookHandler>,
}

/// POST /webhooks/stripe - Process a payment webhook delivery.
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing Stripe-Signature header")),
        )
            .into_response();
    };

    let cmd = ProcessWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    match state.pipeline.handle(cmd).await {
        Ok(ProcessOutcome::Reconciled(_)) => {
            (StatusCode::OK, Json(WebhookAck::processed())).into_response()
        }
        Ok(ProcessOutcome::Skipped { reason }) => {
            (StatusCode::OK, Json(WebhookAck::skipped(reason))).into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "Webhook processing failed");
            (
                err.status_code(),
                Json(ErrorResponse::new(err.to_string())),
            )
                .into_response()
        }
    }
}

/// Fallback for non-POST requests on the webhook route.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
}

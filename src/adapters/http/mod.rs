//! HTTP adapter - the inbound webhook endpoint.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, WebhookAck};
pub use handlers::AppState;
pub use routes::{app_router, webhook_routes};

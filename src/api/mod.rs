//! HTTP surface: a single `POST /webhook` route.

pub mod webhook;

use axum::{Router, routing};

use crate::SharedState;

pub use webhook::{DeliveryOutcome, handle_webhook, process_push};

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/webhook", routing::post(handle_webhook))
        .with_state(state)
}

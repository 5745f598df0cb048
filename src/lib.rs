//! Registration API
//!
//! Order-intake reconciliation pipeline for an event-registration
//! storefront: untrusted carts are revalidated against the catalog, a
//! payment intent is issued, and confirmed payments are materialized into
//! durable order records exactly once.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod models;
pub mod payments;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

/// Assemble the HTTP surface: cart submission, the webhook receiver, and
/// health.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/payment-intents",
            post(handlers::checkout::create_payment_intent),
        )
        .route(
            "/webhooks/payments",
            post(handlers::webhooks::payment_webhook),
        )
        .with_state(state)
}

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    errors::ServiceError,
    models::webhook::{WebhookEvent, EVENT_PAYMENT_FAILED, EVENT_PAYMENT_SUCCEEDED},
    payments::signature,
    AppState,
};

/// Header carrying the `t=...,v1=...` signature over the raw body.
pub const SIGNATURE_HEADER: &str = "payment-signature";

/// POST /webhooks/payments
///
/// The signature covers the exact request bytes, so the body is taken raw
/// and verified before any parsing. Verified events are dispatched by
/// kind; unknown kinds are acknowledged. A retryable handler failure
/// returns 500 so the processor's redelivery schedule drives recovery;
/// that redelivery is the pipeline's only retry mechanism.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature_header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let verified = signature_header.is_some_and(|header| {
        signature::verify(
            header,
            &body,
            &state.config.webhook_secret,
            state.config.webhook_tolerance_secs,
        )
    });
    if !verified {
        warn!("webhook signature verification failed");
        return ServiceError::SignatureVerificationFailed.into_response();
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!("webhook payload unparseable: {}", err);
            return ServiceError::BadRequest(format!("invalid payload: {err}")).into_response();
        }
    };

    let intent_id = event.data.object.id.clone();
    let result = match event.event_type.as_str() {
        EVENT_PAYMENT_SUCCEEDED => state
            .services
            .orders
            .materialize(&event.data.object)
            .await
            .map(|_| ()),
        EVENT_PAYMENT_FAILED => state
            .services
            .orders
            .record_payment_failure(&intent_id)
            .await
            .map(|_| ()),
        other => {
            info!(event_type = other, "ignoring webhook event");
            Ok(())
        }
    };

    match result {
        Ok(()) => acknowledged(),
        Err(err @ ServiceError::CorruptIntentMetadata(_)) => {
            // Redelivery cannot repair the payload; acknowledge so the
            // processor stops retrying, and leave a loud trail for manual
            // investigation.
            error!(%intent_id, "unrecoverable webhook failure: {}", err);
            acknowledged()
        }
        Err(err) => {
            error!(%intent_id, "webhook handler failed, requesting redelivery: {}", err);
            err.into_response()
        }
    }
}

fn acknowledged() -> Response {
    (StatusCode::OK, Json(json!({ "received": true }))).into_response()
}

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    errors::ServiceError,
    models::cart::{CartLineRequest, CustomerDraft},
    AppState,
};

/// Cart submission body. The items are untrusted; every price is
/// recomputed server-side before anything reaches the processor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CartLineRequest>,
    pub customer: CustomerDraft,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub client_secret: String,
}

/// POST /payment-intents
///
/// Validates the cart against the catalog, runs the customer-resolution
/// sub-protocol, and creates the payment authorization. No order rows are
/// written here; those wait for the processor's confirmation webhook.
#[instrument(skip(state, request), fields(item_count = request.items.len()))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ServiceError> {
    request.customer.validate()?;

    let cart = state.services.cart.validate(&request.items).await?;
    let issued = state
        .services
        .payments
        .issue(&cart, &request.customer)
        .await?;

    Ok(Json(CheckoutResponse {
        client_secret: issued.client_secret,
    }))
}

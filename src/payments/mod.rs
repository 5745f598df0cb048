pub mod signature;
pub mod stripe;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::{errors::ServiceError, models::cart::CustomerDraft};

pub use stripe::StripeGateway;

/// Processor-side customer record.
#[derive(Debug, Clone)]
pub struct ProviderCustomer {
    pub id: String,
    pub email: String,
}

/// Created authorization. `client_secret` goes back to the browser to
/// complete the charge; `id` becomes the order idempotency key.
#[derive(Debug, Clone)]
pub struct ProviderPaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct CreateIntentRequest {
    pub amount_minor_units: i64,
    pub currency: String,
    pub customer_id: String,
    pub metadata: HashMap<String, String>,
}

/// Capability interface over the card processor. Everything the pipeline
/// needs from the vendor goes through here, so an alternate processor can
/// be substituted without touching the intake logic.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<ProviderCustomer>, ServiceError>;

    async fn create_customer(&self, draft: &CustomerDraft)
        -> Result<ProviderCustomer, ServiceError>;

    /// Push the latest profile fields onto an existing processor customer.
    async fn update_customer(
        &self,
        customer_id: &str,
        draft: &CustomerDraft,
    ) -> Result<(), ServiceError>;

    async fn create_payment_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<ProviderPaymentIntent, ServiceError>;
}

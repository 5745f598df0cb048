use std::sync::Arc;

use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing::{info, instrument, warn};

use crate::{
    entities::customer,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        cart::{CustomerDraft, ValidatedCart},
        metadata::IntentMetadata,
    },
    payments::{CreateIntentRequest, PaymentProvider},
};

use super::customers::find_by_email;

/// The authorization handed back to the client to complete payment.
#[derive(Debug, Clone)]
pub struct IssuedIntent {
    pub intent_id: String,
    pub client_secret: String,
}

/// Creates payment-processor authorizations for validated carts. No local
/// order rows are written here; the order exists only once the processor
/// confirms payment through the webhook.
#[derive(Clone)]
pub struct PaymentIntentService {
    db: Arc<DatabaseConnection>,
    provider: Arc<dyn PaymentProvider>,
    event_sender: EventSender,
    currency: String,
}

impl PaymentIntentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        provider: Arc<dyn PaymentProvider>,
        event_sender: EventSender,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            db,
            provider,
            event_sender,
            currency: currency.into(),
        }
    }

    #[instrument(skip(self, cart, draft), fields(total = cart.total_minor_units))]
    pub async fn issue(
        &self,
        cart: &ValidatedCart,
        draft: &CustomerDraft,
    ) -> Result<IssuedIntent, ServiceError> {
        let processor_customer_id = self.resolve_processor_customer(draft).await?;

        // Processor-side data must reflect the latest submission, not a
        // prior order's profile.
        self.provider
            .update_customer(&processor_customer_id, draft)
            .await?;

        let metadata = IntentMetadata::new(cart.line_items.clone(), draft.clone());
        let intent = self
            .provider
            .create_payment_intent(CreateIntentRequest {
                amount_minor_units: cart.total_minor_units,
                currency: self.currency.clone(),
                customer_id: processor_customer_id,
                metadata: metadata.to_provider_map()?,
            })
            .await?;

        self.event_sender
            .send(Event::IntentIssued {
                payment_intent_id: intent.id.clone(),
                amount_minor_units: cart.total_minor_units,
                currency: self.currency.clone(),
            })
            .await;

        info!(intent_id = %intent.id, "payment intent issued");
        Ok(IssuedIntent {
            intent_id: intent.id,
            client_secret: intent.client_secret,
        })
    }

    /// Customer resolution, in the order that avoids duplicate
    /// processor-side customers: store cache, then processor search by
    /// email, then create.
    async fn resolve_processor_customer(
        &self,
        draft: &CustomerDraft,
    ) -> Result<String, ServiceError> {
        let email = draft.normalized_email();

        let cached = find_by_email(&*self.db, &email)
            .await?
            .and_then(|c| c.processor_customer_id);
        if let Some(id) = cached {
            return Ok(id);
        }

        if let Some(found) = self.provider.find_customer_by_email(&email).await? {
            self.backfill_cached_id(&email, &found.id).await;
            return Ok(found.id);
        }

        let created = self.provider.create_customer(draft).await?;
        self.backfill_cached_id(&email, &created.id).await;
        Ok(created.id)
    }

    /// Cache the processor customer id on the local row when one exists.
    /// Non-critical: a failure here costs one extra processor lookup on
    /// the next order, so it is logged and swallowed.
    async fn backfill_cached_id(&self, email: &str, processor_customer_id: &str) {
        let result = async {
            if let Some(existing) = find_by_email(&*self.db, email).await? {
                if existing.processor_customer_id.is_none() {
                    let mut active: customer::ActiveModel = existing.into();
                    active.processor_customer_id = Set(Some(processor_customer_id.to_string()));
                    active.updated_at = Set(chrono::Utc::now());
                    active.update(&*self.db).await?;
                }
            }
            Ok::<(), ServiceError>(())
        }
        .await;

        if let Err(err) = result {
            warn!(email, "failed to cache processor customer id: {}", err);
        }
    }
}

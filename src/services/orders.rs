use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, SqlErr, TransactionTrait,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::{booking, order, order_line_item},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        cart::{LineItemDetails, ValidatedLineItem},
        metadata::IntentMetadata,
        webhook::PaymentIntentObject,
    },
};

use super::customers::find_or_create_customer;

/// Result of a materialization attempt. Redelivered notifications for an
/// already-recorded intent resolve to `AlreadyExists`.
#[derive(Debug)]
pub enum MaterializeOutcome {
    Created {
        order: order::Model,
        line_item_count: usize,
    },
    AlreadyExists {
        order: order::Model,
    },
}

/// Turns confirmed payments into durable records, exactly once per
/// payment intent, and records failed payments. The unique index on
/// `orders.payment_intent_id` is the idempotency primitive; order, line
/// items, and bookings commit in one transaction so a crash mid-sequence
/// leaves either nothing or a fully-consistent order.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Materialize a verified `payment_intent.succeeded` notification.
    ///
    /// The notification's amount is authoritative here: it reflects what
    /// the processor actually captured. Order content comes from the
    /// metadata embedded at intent creation.
    #[instrument(skip(self, intent), fields(payment_intent_id = %intent.id))]
    pub async fn materialize(
        &self,
        intent: &PaymentIntentObject,
    ) -> Result<MaterializeOutcome, ServiceError> {
        if let Some(existing) = self.find_by_intent_id(&intent.id).await? {
            info!("order already materialized, ignoring redelivery");
            return Ok(MaterializeOutcome::AlreadyExists { order: existing });
        }

        // Unparseable metadata will never become parseable; this error is
        // fatal, not retryable.
        let metadata = IntentMetadata::from_provider_map(&intent.metadata)?;

        // A succeeded notification without any amount is as unrepairable
        // as bad metadata; never default it to a zero-amount order.
        let amount = intent.captured_amount().ok_or_else(|| {
            ServiceError::CorruptIntentMetadata(
                "succeeded notification carries no amount".to_string(),
            )
        })?;

        let txn = self.db.begin().await?;

        let customer = find_or_create_customer(&txn, &metadata.customer, None).await?;

        let Some(inserted) = insert_order_row(&txn, intent, customer.id, amount).await? else {
            // A concurrent delivery won the insert race; adopt its order.
            txn.rollback().await?;
            let existing = self.find_by_intent_id(&intent.id).await?.ok_or_else(|| {
                ServiceError::InternalError(
                    "order vanished after unique-constraint violation".to_string(),
                )
            })?;
            info!("concurrent delivery materialized this intent first");
            return Ok(MaterializeOutcome::AlreadyExists { order: existing });
        };
        let order_id = inserted.id;

        let mut line_item_count = 0usize;
        for item in &metadata.line_items {
            match self.insert_line_item(&txn, order_id, item).await {
                Ok(()) => line_item_count += 1,
                Err(LineItemError::Malformed(reason)) => {
                    // One bad line must not abort the order; the rest of
                    // the purchase still gets recorded.
                    warn!(product_id = %item.product_id, reason, "skipping malformed line item");
                }
                Err(LineItemError::Store(err)) => {
                    // Store failures roll back the whole order so the
                    // processor redelivers and we retry from scratch.
                    return Err(err);
                }
            }
        }

        if line_item_count == 0 {
            warn!("order materialized with zero line items");
        }

        txn.commit().await?;

        self.event_sender
            .send(Event::OrderMaterialized {
                order_id,
                payment_intent_id: intent.id.clone(),
                line_item_count,
            })
            .await;

        info!(%order_id, line_item_count, "order materialized");
        Ok(MaterializeOutcome::Created {
            order: inserted,
            line_item_count,
        })
    }

    /// Record a `payment_intent.payment_failed` notification. Only a
    /// pending order is flipped to failed; a succeeded order is left
    /// untouched so reordered deliveries cannot downgrade it. A missing
    /// order is not an error: the intent may never have produced local
    /// state.
    #[instrument(skip(self))]
    pub async fn record_payment_failure(
        &self,
        payment_intent_id: &str,
    ) -> Result<bool, ServiceError> {
        let Some(existing) = self.find_by_intent_id(payment_intent_id).await? else {
            info!("no order for failed intent, acknowledging");
            self.event_sender
                .send(Event::PaymentFailureRecorded {
                    payment_intent_id: payment_intent_id.to_string(),
                    order_found: false,
                })
                .await;
            return Ok(false);
        };

        match existing.status {
            order::OrderStatus::Pending => {
                let mut active: order::ActiveModel = existing.into();
                active.status = Set(order::OrderStatus::Failed);
                active.updated_at = Set(Utc::now());
                active.update(&*self.db).await?;
                self.event_sender
                    .send(Event::PaymentFailureRecorded {
                        payment_intent_id: payment_intent_id.to_string(),
                        order_found: true,
                    })
                    .await;
                info!("order marked failed");
                Ok(true)
            }
            order::OrderStatus::Succeeded => {
                warn!("failure notification arrived after success; keeping succeeded status");
                Ok(false)
            }
            order::OrderStatus::Failed => {
                info!("order already failed, ignoring redelivery");
                Ok(false)
            }
        }
    }

    pub async fn find_by_intent_id(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<order::Model>, ServiceError> {
        Ok(order::Entity::find()
            .filter(order::Column::PaymentIntentId.eq(payment_intent_id))
            .one(&*self.db)
            .await?)
    }

    async fn insert_line_item<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_id: Uuid,
        item: &ValidatedLineItem,
    ) -> Result<(), LineItemError> {
        if item.quantity < 1 {
            return Err(LineItemError::Malformed("quantity below 1".to_string()));
        }
        if let LineItemDetails::Accommodation {
            check_in,
            check_out,
            nights,
            guests,
            ..
        } = &item.details
        {
            if check_out <= check_in {
                return Err(LineItemError::Malformed(
                    "checkOut not after checkIn".to_string(),
                ));
            }
            if i64::from(*nights) != (*check_out - *check_in).num_days() {
                return Err(LineItemError::Malformed(
                    "nights disagree with stay dates".to_string(),
                ));
            }
            if *guests < 1 {
                return Err(LineItemError::Malformed("guest count below 1".to_string()));
            }
        }

        let line_item_id = Uuid::new_v4();
        let details = serde_json::to_value(&item.details).map_err(|e| {
            error!("line item details unserializable: {}", e);
            LineItemError::Malformed(format!("details unserializable: {e}"))
        })?;

        order_line_item::ActiveModel {
            id: Set(line_item_id),
            order_id: Set(order_id),
            product_type: Set(item.product_type),
            product_id: Set(item.product_id.clone()),
            product_name: Set(item.product_name.clone()),
            quantity: Set(item.quantity),
            unit_price_minor_units: Set(item.unit_price_minor_units),
            line_total_minor_units: Set(item.line_total_minor_units),
            details: Set(Some(details)),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await
        .map_err(|e| LineItemError::Store(e.into()))?;

        if let LineItemDetails::Accommodation {
            check_in,
            check_out,
            nights,
            guests,
            price_per_night_minor_units,
        } = &item.details
        {
            booking::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                order_line_item_id: Set(line_item_id),
                product_id: Set(item.product_id.clone()),
                check_in: Set(*check_in),
                check_out: Set(*check_out),
                nights: Set(*nights),
                guest_count: Set(*guests),
                price_per_night_minor_units: Set(*price_per_night_minor_units),
                total_minor_units: Set(item.line_total_minor_units),
                created_at: Set(Utc::now()),
            }
            .insert(conn)
            .await
            .map_err(|e| LineItemError::Store(e.into()))?;
        }

        Ok(())
    }
}

/// Insert the order row for a payment intent. `None` means a concurrent
/// materialization already claimed the intent id through the unique
/// index; the caller adopts the existing row.
async fn insert_order_row<C: ConnectionTrait>(
    conn: &C,
    intent: &PaymentIntentObject,
    customer_id: Uuid,
    amount_minor_units: i64,
) -> Result<Option<order::Model>, ServiceError> {
    let model = order::ActiveModel {
        id: Set(Uuid::new_v4()),
        payment_intent_id: Set(intent.id.clone()),
        customer_id: Set(customer_id),
        amount_minor_units: Set(amount_minor_units),
        currency: Set(intent.currency.clone().unwrap_or_else(|| "usd".to_string())),
        status: Set(order::OrderStatus::Succeeded),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    };
    match model.insert(conn).await {
        Ok(inserted) => Ok(Some(inserted)),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

enum LineItemError {
    /// The individual line is structurally unusable; skip it.
    Malformed(String),
    /// The store failed; abort and let redelivery retry.
    Store(ServiceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrator::Migrator;
    use crate::models::cart::CustomerDraft;
    use sea_orm::{Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;
    use std::collections::HashMap;

    async fn test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn draft() -> CustomerDraft {
        CustomerDraft {
            email: "jamie@example.com".into(),
            name: Some("Jamie".into()),
            phone: None,
            address: None,
            shirt_size: None,
            measurements: None,
            companion_name: None,
        }
    }

    fn intent(id: &str) -> PaymentIntentObject {
        PaymentIntentObject {
            id: id.into(),
            amount: Some(5_000),
            amount_received: Some(5_000),
            currency: Some("usd".into()),
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn losing_the_order_insert_race_yields_no_row() {
        let db = test_db().await;
        let customer = find_or_create_customer(&db, &draft(), None).await.unwrap();

        let winner = insert_order_row(&db, &intent("pi_race"), customer.id, 5_000)
            .await
            .unwrap();
        assert!(winner.is_some());

        // The second insert for the same intent id hits the unique index
        // and resolves to None instead of an error.
        let loser = insert_order_row(&db, &intent("pi_race"), customer.id, 5_000)
            .await
            .unwrap();
        assert!(loser.is_none());
    }
}

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::customer,
    errors::ServiceError,
    models::cart::CustomerDraft,
};

/// Find or create the customer row for a draft's email, updating profile
/// fields in place on the existing row. Shared by intent issuance and
/// order materialization so both sides apply the same lifecycle:
/// created on first order, enriched (never replaced) afterward.
///
/// Works over any `ConnectionTrait` so the materializer can run it inside
/// its transaction. A concurrent duplicate insert for the same brand-new
/// email is resolved by catching the unique-constraint violation and
/// re-querying; the loser adopts the winner's row.
#[instrument(skip(conn, draft), fields(email = %draft.normalized_email()))]
pub async fn find_or_create_customer<C: ConnectionTrait>(
    conn: &C,
    draft: &CustomerDraft,
    processor_customer_id: Option<&str>,
) -> Result<customer::Model, ServiceError> {
    let email = draft.normalized_email();

    if let Some(existing) = find_by_email(conn, &email).await? {
        return update_profile(conn, existing, draft, processor_customer_id).await;
    }

    insert_new(conn, &email, draft, processor_customer_id).await
}

/// Insert a row for a brand-new email. A concurrent insert for the same
/// email loses through the unique index; the loser re-queries and adopts
/// the winner's row.
async fn insert_new<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    draft: &CustomerDraft,
    processor_customer_id: Option<&str>,
) -> Result<customer::Model, ServiceError> {
    let model = customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        name: Set(draft.display_name()),
        phone: Set(draft.phone.clone()),
        address: Set(address_json(draft)),
        shirt_size: Set(draft.shirt_size.clone()),
        measurements: Set(draft.measurements.clone()),
        companion_name: Set(draft.companion_name.clone()),
        processor_customer_id: Set(processor_customer_id.map(|s| s.to_string())),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    };

    match model.insert(conn).await {
        Ok(created) => {
            info!(customer_id = %created.id, "customer created");
            Ok(created)
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            warn!("lost customer-creation race, adopting existing row");
            let winner = find_by_email(conn, email)
                .await?
                .ok_or_else(|| ServiceError::InternalError(
                    "customer vanished after unique-constraint violation".to_string(),
                ))?;
            update_profile(conn, winner, draft, processor_customer_id).await
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn find_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> Result<Option<customer::Model>, ServiceError> {
    Ok(customer::Entity::find()
        .filter(customer::Column::Email.eq(email))
        .one(conn)
        .await?)
}

/// Push the latest submitted fields onto an existing row. Absent draft
/// fields leave the stored value alone; the processor customer id is only
/// backfilled, never cleared.
async fn update_profile<C: ConnectionTrait>(
    conn: &C,
    existing: customer::Model,
    draft: &CustomerDraft,
    processor_customer_id: Option<&str>,
) -> Result<customer::Model, ServiceError> {
    let backfill_processor_id = existing.processor_customer_id.is_none();
    let mut active: customer::ActiveModel = existing.into();

    if let Some(name) = &draft.name {
        active.name = Set(name.clone());
    }
    if let Some(phone) = &draft.phone {
        active.phone = Set(Some(phone.clone()));
    }
    if draft.address.is_some() {
        active.address = Set(address_json(draft));
    }
    if let Some(size) = &draft.shirt_size {
        active.shirt_size = Set(Some(size.clone()));
    }
    if let Some(measurements) = &draft.measurements {
        active.measurements = Set(Some(measurements.clone()));
    }
    if let Some(companion) = &draft.companion_name {
        active.companion_name = Set(Some(companion.clone()));
    }
    if backfill_processor_id {
        if let Some(id) = processor_customer_id {
            active.processor_customer_id = Set(Some(id.to_string()));
        }
    }
    active.updated_at = Set(Utc::now());

    Ok(active.update(conn).await?)
}

fn address_json(draft: &CustomerDraft) -> Option<serde_json::Value> {
    draft
        .address
        .as_ref()
        .and_then(|a| serde_json::to_value(a).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrator::Migrator;
    use sea_orm::{Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;

    async fn test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn draft(name: &str) -> CustomerDraft {
        CustomerDraft {
            email: "jamie@example.com".into(),
            name: Some(name.into()),
            phone: None,
            address: None,
            shirt_size: None,
            measurements: None,
            companion_name: None,
        }
    }

    #[tokio::test]
    async fn losing_the_creation_race_adopts_the_winner() {
        let db = test_db().await;
        let winner = find_or_create_customer(&db, &draft("Jamie"), None)
            .await
            .unwrap();

        // A racing insert for the same email hits the unique index inside
        // insert_new; the loser must come back with the winner's row,
        // carrying the latest profile and the backfilled processor id.
        let adopted = insert_new(&db, "jamie@example.com", &draft("Jamie R. Rivera"), Some("cus_42"))
            .await
            .unwrap();

        assert_eq!(adopted.id, winner.id);
        assert_eq!(adopted.name, "Jamie R. Rivera");
        assert_eq!(adopted.processor_customer_id.as_deref(), Some("cus_42"));

        let rows = customer::Entity::find().all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn backfilled_processor_id_is_never_cleared() {
        let db = test_db().await;
        find_or_create_customer(&db, &draft("Jamie"), Some("cus_first"))
            .await
            .unwrap();

        let updated = find_or_create_customer(&db, &draft("Jamie"), None)
            .await
            .unwrap();
        assert_eq!(updated.processor_customer_id.as_deref(), Some("cus_first"));
    }
}

use std::time::Duration;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    Set,
};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::{
    config::AppConfig,
    entities::catalog_product::{self, ProductType},
    errors::ServiceError,
    migrator::Migrator,
};

/// Establish the connection pool with bounded timeouts so no store call
/// can block indefinitely.
pub async fn establish_connection(config: &AppConfig) -> Result<DatabaseConnection, ServiceError> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!("database connection established");
    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), ServiceError> {
    Migrator::up(db, None)
        .await
        .map_err(ServiceError::DatabaseError)?;
    info!("migrations applied");
    Ok(())
}

/// Seed a small catalog for local development. No-op when any product
/// already exists.
pub async fn seed_demo_catalog(db: &DatabaseConnection) -> Result<(), ServiceError> {
    if catalog_product::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    let rows = [
        (ProductType::Activity, "hike", "Guided summit hike", 5_000),
        (ProductType::Activity, "kayak-tour", "Sunrise kayak tour", 15_000),
        (
            ProductType::Accommodation,
            "lakeside-cabin",
            "Lakeside cabin (per night)",
            20_000,
        ),
        (
            ProductType::Sponsorship,
            "bronze-sponsor",
            "Bronze sponsorship",
            50_000,
        ),
    ];

    for (product_type, id, name, price) in rows {
        catalog_product::ActiveModel {
            id: Set(id.to_string()),
            product_type: Set(product_type),
            name: Set(name.to_string()),
            price_minor_units: Set(price),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;
    }

    info!("demo catalog seeded");
    Ok(())
}

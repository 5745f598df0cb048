use std::sync::Arc;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::instrument;

use crate::{
    entities::catalog_product::{self, ProductType},
    errors::ServiceError,
};

/// Authoritative unit price and display name for a catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProduct {
    pub unit_price_minor_units: i64,
    pub display_name: String,
}

/// The single source of truth for money. Reads the catalog store only,
/// never client input.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Resolve a product reference to its catalog price and name.
    ///
    /// The only error kinds this emits for a resolvable request are
    /// `ProductNotFound` (no row for this type + id) and
    /// `InvalidCatalogPrice` (stored price is negative).
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        product_type: ProductType,
        product_id: &str,
    ) -> Result<ResolvedProduct, ServiceError> {
        let product = catalog_product::Entity::find()
            .filter(catalog_product::Column::Id.eq(product_id))
            .filter(catalog_product::Column::ProductType.eq(product_type))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::ProductNotFound {
                product_type,
                product_id: product_id.to_string(),
            })?;

        if product.price_minor_units < 0 {
            return Err(ServiceError::InvalidCatalogPrice {
                product_type,
                product_id: product_id.to_string(),
            });
        }

        Ok(ResolvedProduct {
            unit_price_minor_units: product.price_minor_units,
            display_name: product.name,
        })
    }
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Authoritative catalog row. Prices live here and nowhere else;
/// client-claimed prices are never persisted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_products")]
pub struct Model {
    /// Human-readable slug, e.g. "hike" or "lakeside-cabin".
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub product_type: ProductType,
    pub name: String,
    /// For accommodation this is the per-night price.
    pub price_minor_units: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Product kind, a tagged variant rather than ad hoc field sniffing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[sea_orm(string_value = "activity")]
    Activity,
    #[sea_orm(string_value = "accommodation")]
    Accommodation,
    #[sea_orm(string_value = "sponsorship")]
    Sponsorship,
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProductType::Activity => "activity",
            ProductType::Accommodation => "accommodation",
            ProductType::Sponsorship => "sponsorship",
        };
        f.write_str(s)
    }
}

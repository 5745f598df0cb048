use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer profile, keyed naturally by lower-cased email (unique index).
/// Created on first order and updated in place on subsequent orders;
/// never deleted by the pipeline.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    #[sea_orm(nullable)]
    pub phone: Option<String>,
    /// Postal address as JSON (line1/city/postal_code/country).
    #[sea_orm(column_type = "Json", nullable)]
    pub address: Option<Json>,
    #[sea_orm(nullable)]
    pub shirt_size: Option<String>,
    /// Event-specific physical measurements, free-form JSON.
    #[sea_orm(column_type = "Json", nullable)]
    pub measurements: Option<Json>,
    #[sea_orm(nullable)]
    pub companion_name: Option<String>,
    /// Cached processor-side customer id; backfilled when missing.
    #[sea_orm(nullable)]
    pub processor_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#![allow(elided_lifetimes_in_paths)]

use sea_orm_migration::prelude::*;

/// Schema migrations. The unique indexes on `customers.email` and
/// `orders.payment_intent_id` are the pipeline's cross-request
/// concurrency primitives.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_catalog_products::Migration),
            Box::new(m20250101_000002_create_customers::Migration),
            Box::new(m20250101_000003_create_orders::Migration),
            Box::new(m20250101_000004_create_order_line_items::Migration),
            Box::new(m20250101_000005_create_bookings::Migration),
        ]
    }
}

mod m20250101_000001_create_catalog_products {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_catalog_products"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CatalogProducts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CatalogProducts::Id)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CatalogProducts::ProductType)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(CatalogProducts::Name).string().not_null())
                        .col(
                            ColumnDef::new(CatalogProducts::PriceMinorUnits)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CatalogProducts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_catalog_products_type")
                        .table(CatalogProducts::Table)
                        .col(CatalogProducts::ProductType)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CatalogProducts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CatalogProducts {
        Table,
        Id,
        ProductType,
        Name,
        PriceMinorUnits,
        CreatedAt,
    }
}

mod m20250101_000002_create_customers {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_customers"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Customers::Id).uuid().primary_key().not_null())
                        // The natural key; the unique index is what makes
                        // concurrent find-or-create races detectable.
                        .col(
                            ColumnDef::new(Customers::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).json().null())
                        .col(ColumnDef::new(Customers::ShirtSize).string().null())
                        .col(ColumnDef::new(Customers::Measurements).json().null())
                        .col(ColumnDef::new(Customers::CompanionName).string().null())
                        .col(
                            ColumnDef::new(Customers::ProcessorCustomerId)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        Email,
        Name,
        Phone,
        Address,
        ShirtSize,
        Measurements,
        CompanionName,
        ProcessorCustomerId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000003_create_orders {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_orders"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        // The idempotency key for webhook materialization.
                        .col(
                            ColumnDef::new(Orders::PaymentIntentId)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(
                            ColumnDef::new(Orders::AmountMinorUnits)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::Currency).string_len(3).not_null())
                        .col(ColumnDef::new(Orders::Status).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        PaymentIntentId,
        CustomerId,
        AmountMinorUnits,
        Currency,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
    }
}

mod m20250101_000004_create_order_line_items {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_order_line_items"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderLineItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderLineItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderLineItems::OrderId).uuid().not_null())
                        .col(
                            ColumnDef::new(OrderLineItems::ProductType)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderLineItems::ProductId)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderLineItems::ProductName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderLineItems::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderLineItems::UnitPriceMinorUnits)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderLineItems::LineTotalMinorUnits)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderLineItems::Details).json().null())
                        .col(
                            ColumnDef::new(OrderLineItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_line_items_order")
                                .from(OrderLineItems::Table, OrderLineItems::OrderId)
                                .to(Orders::Table, Orders::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_order_line_items_order")
                        .table(OrderLineItems::Table)
                        .col(OrderLineItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderLineItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderLineItems {
        Table,
        Id,
        OrderId,
        ProductType,
        ProductId,
        ProductName,
        Quantity,
        UnitPriceMinorUnits,
        LineTotalMinorUnits,
        Details,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
    }
}

mod m20250101_000005_create_bookings {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_bookings"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Bookings::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Bookings::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Bookings::OrderId).uuid().not_null())
                        .col(
                            ColumnDef::new(Bookings::OrderLineItemId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Bookings::ProductId).string().not_null())
                        .col(ColumnDef::new(Bookings::CheckIn).date().not_null())
                        .col(ColumnDef::new(Bookings::CheckOut).date().not_null())
                        .col(ColumnDef::new(Bookings::Nights).integer().not_null())
                        .col(ColumnDef::new(Bookings::GuestCount).integer().not_null())
                        .col(
                            ColumnDef::new(Bookings::PricePerNightMinorUnits)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Bookings::TotalMinorUnits)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Bookings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bookings_order")
                                .from(Bookings::Table, Bookings::OrderId)
                                .to(Orders::Table, Orders::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_bookings_line_item")
                                .from(Bookings::Table, Bookings::OrderLineItemId)
                                .to(OrderLineItems::Table, OrderLineItems::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Bookings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Bookings {
        Table,
        Id,
        OrderId,
        OrderLineItemId,
        ProductId,
        CheckIn,
        CheckOut,
        Nights,
        GuestCount,
        PricePerNightMinorUnits,
        TotalMinorUnits,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum OrderLineItems {
        Table,
        Id,
    }
}

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_tenancy_tables::Migration),
            Box::new(m20240301_000002_create_party_tables::Migration),
            Box::new(m20240301_000003_create_warehouse_tables::Migration),
            Box::new(m20240301_000004_create_inventory_job_tables::Migration),
            Box::new(m20240301_000005_create_container_tables::Migration),
            Box::new(m20240301_000006_create_stock_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_tenancy_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_tenancy_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tenants::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Tenants::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Tenants::Name).string().not_null())
                        .col(
                            ColumnDef::new(Tenants::Subdomain)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Tenants::ContactEmail).string().null())
                        .col(
                            ColumnDef::new(Tenants::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Tenants::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Tenants::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Roles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Roles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Roles::TenantId).uuid().null())
                        .col(ColumnDef::new(Roles::Name).string().not_null())
                        .col(ColumnDef::new(Roles::Description).string().null())
                        .col(
                            ColumnDef::new(Roles::IsSystem)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Roles::Permissions).json().not_null())
                        .col(
                            ColumnDef::new(Roles::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Roles::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::TenantId).uuid().null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::RoleId).uuid().null())
                        .col(ColumnDef::new(Users::Collection).string().not_null())
                        .col(ColumnDef::new(Users::CustomerId).uuid().null())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_tenant_email")
                        .table(Users::Table)
                        .col(Users::TenantId)
                        .col(Users::Email)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_role_id")
                        .table(Users::Table)
                        .col(Users::RoleId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Roles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tenants::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Tenants {
        Table,
        Id,
        Name,
        Subdomain,
        ContactEmail,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Roles {
        Table,
        Id,
        TenantId,
        Name,
        Description,
        IsSystem,
        Permissions,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        TenantId,
        Email,
        Name,
        RoleId,
        Collection,
        CustomerId,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_party_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_party_tables"
        }
    }

    /// Customers and paying customers share one column layout
    fn party_table<T: IntoIden + 'static>(table: T) -> TableCreateStatement {
        Table::create()
            .table(table)
            .if_not_exists()
            .col(ColumnDef::new(Party::Id).uuid().primary_key().not_null())
            .col(ColumnDef::new(Party::TenantId).uuid().not_null())
            .col(ColumnDef::new(Party::Name).string().not_null())
            .col(ColumnDef::new(Party::Email).string().null())
            .col(ColumnDef::new(Party::Phone).string().null())
            .col(ColumnDef::new(Party::AddressLine1).string().null())
            .col(ColumnDef::new(Party::AddressLine2).string().null())
            .col(ColumnDef::new(Party::City).string().null())
            .col(ColumnDef::new(Party::State).string().null())
            .col(ColumnDef::new(Party::Postcode).string().null())
            .col(ColumnDef::new(Party::Country).string().null())
            .col(
                ColumnDef::new(Party::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Party::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(party_table(Customers::Table))
                .await?;
            manager
                .create_table(party_table(PayingCustomers::Table))
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_tenant_id")
                        .table(Customers::Table)
                        .col(Party::TenantId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PayingCustomers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
    }

    #[derive(DeriveIden)]
    enum PayingCustomers {
        Table,
    }

    #[derive(DeriveIden)]
    enum Party {
        Id,
        TenantId,
        Name,
        Email,
        Phone,
        AddressLine1,
        AddressLine2,
        City,
        State,
        Postcode,
        Country,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000003_create_warehouse_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_warehouse_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Warehouses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Warehouses::TenantId).uuid().not_null())
                        .col(ColumnDef::new(Warehouses::Name).string().not_null())
                        .col(ColumnDef::new(Warehouses::Code).string().not_null())
                        .col(ColumnDef::new(Warehouses::AddressLine1).string().null())
                        .col(ColumnDef::new(Warehouses::AddressLine2).string().null())
                        .col(ColumnDef::new(Warehouses::City).string().null())
                        .col(ColumnDef::new(Warehouses::State).string().null())
                        .col(ColumnDef::new(Warehouses::Postcode).string().null())
                        .col(ColumnDef::new(Warehouses::Country).string().null())
                        .col(
                            ColumnDef::new(Warehouses::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Warehouses::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Warehouses::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StorageUnits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StorageUnits::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StorageUnits::TenantId).uuid().not_null())
                        .col(ColumnDef::new(StorageUnits::Name).string().not_null())
                        .col(
                            ColumnDef::new(StorageUnits::LengthPerSuMm)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StorageUnits::WidthPerSuMm)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StorageUnits::HeightPerSuMm)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(StorageUnits::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StorageUnits::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Skus::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Skus::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Skus::TenantId).uuid().not_null())
                        .col(ColumnDef::new(Skus::CustomerId).uuid().null())
                        .col(ColumnDef::new(Skus::SkuCode).string().not_null())
                        .col(ColumnDef::new(Skus::Description).string().null())
                        .col(ColumnDef::new(Skus::StorageUnitId).uuid().null())
                        .col(ColumnDef::new(Skus::LengthPerHuMm).decimal_len(16, 4).null())
                        .col(ColumnDef::new(Skus::WidthPerHuMm).decimal_len(16, 4).null())
                        .col(ColumnDef::new(Skus::HeightPerHuMm).decimal_len(16, 4).null())
                        .col(ColumnDef::new(Skus::WeightPerHuKg).decimal_len(16, 4).null())
                        .col(
                            ColumnDef::new(Skus::ExpectedCubicPerHu)
                                .decimal_len(16, 9)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Skus::ExpectedCubicPerHuAuto)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Skus::SqmPerSu).decimal_len(16, 6).null())
                        .col(
                            ColumnDef::new(Skus::SqmPerSuAuto)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Skus::CasesPerLayer).integer().null())
                        .col(
                            ColumnDef::new(Skus::CasesPerLayerAuto)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Skus::LayersPerPallet).integer().null())
                        .col(
                            ColumnDef::new(Skus::LayersPerPalletAuto)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Skus::CasesPerPallet).integer().null())
                        .col(
                            ColumnDef::new(Skus::CasesPerPalletAuto)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Skus::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Skus::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_skus_tenant_sku_code")
                        .table(Skus::Table)
                        .col(Skus::TenantId)
                        .col(Skus::SkuCode)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Skus::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StorageUnits::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Warehouses {
        Table,
        Id,
        TenantId,
        Name,
        Code,
        AddressLine1,
        AddressLine2,
        City,
        State,
        Postcode,
        Country,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum StorageUnits {
        Table,
        Id,
        TenantId,
        Name,
        LengthPerSuMm,
        WidthPerSuMm,
        HeightPerSuMm,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Skus {
        Table,
        Id,
        TenantId,
        CustomerId,
        SkuCode,
        Description,
        StorageUnitId,
        LengthPerHuMm,
        WidthPerHuMm,
        HeightPerHuMm,
        WeightPerHuKg,
        ExpectedCubicPerHu,
        ExpectedCubicPerHuAuto,
        SqmPerSu,
        SqmPerSuAuto,
        CasesPerLayer,
        CasesPerLayerAuto,
        LayersPerPallet,
        LayersPerPalletAuto,
        CasesPerPallet,
        CasesPerPalletAuto,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000004_create_inventory_job_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_inventory_job_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InboundJobs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InboundJobs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InboundJobs::TenantId).uuid().not_null())
                        .col(ColumnDef::new(InboundJobs::JobCode).string().not_null())
                        .col(ColumnDef::new(InboundJobs::CustomerId).uuid().null())
                        .col(ColumnDef::new(InboundJobs::WarehouseId).uuid().null())
                        .col(ColumnDef::new(InboundJobs::Status).string().not_null())
                        .col(
                            ColumnDef::new(InboundJobs::ExpectedDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(InboundJobs::CustomerName).string().null())
                        .col(
                            ColumnDef::new(InboundJobs::DeliveryAddressLine1)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InboundJobs::DeliveryAddressLine2)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(InboundJobs::DeliveryCity).string().null())
                        .col(ColumnDef::new(InboundJobs::DeliveryState).string().null())
                        .col(ColumnDef::new(InboundJobs::DeliveryPostcode).string().null())
                        .col(ColumnDef::new(InboundJobs::DeliveryCountry).string().null())
                        .col(ColumnDef::new(InboundJobs::Notes).string().null())
                        .col(
                            ColumnDef::new(InboundJobs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InboundJobs::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InboundProductLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InboundProductLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InboundProductLines::TenantId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InboundProductLines::InboundJobId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InboundProductLines::SkuId).uuid().not_null())
                        .col(
                            ColumnDef::new(InboundProductLines::ExpectedQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InboundProductLines::ReceivedQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InboundProductLines::PutAwayQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InboundProductLines::BatchNumber)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(InboundProductLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InboundProductLines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inbound_product_lines_job")
                                .from(InboundProductLines::Table, InboundProductLines::InboundJobId)
                                .to(InboundJobs::Table, InboundJobs::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OutboundJobs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OutboundJobs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OutboundJobs::TenantId).uuid().not_null())
                        .col(ColumnDef::new(OutboundJobs::JobCode).string().not_null())
                        .col(ColumnDef::new(OutboundJobs::CustomerId).uuid().null())
                        .col(ColumnDef::new(OutboundJobs::WarehouseId).uuid().null())
                        .col(ColumnDef::new(OutboundJobs::Status).string().not_null())
                        .col(
                            ColumnDef::new(OutboundJobs::RequiredDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(OutboundJobs::ConsigneeName).string().null())
                        .col(ColumnDef::new(OutboundJobs::ConsigneeEmail).string().null())
                        .col(ColumnDef::new(OutboundJobs::ConsigneePhone).string().null())
                        .col(
                            ColumnDef::new(OutboundJobs::ConsigneeAddressLine1)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OutboundJobs::ConsigneeAddressLine2)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(OutboundJobs::ConsigneeCity).string().null())
                        .col(ColumnDef::new(OutboundJobs::ConsigneeState).string().null())
                        .col(
                            ColumnDef::new(OutboundJobs::ConsigneePostcode)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OutboundJobs::ConsigneeCountry)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(OutboundJobs::Notes).string().null())
                        .col(
                            ColumnDef::new(OutboundJobs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboundJobs::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OutboundProductLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OutboundProductLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboundProductLines::TenantId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboundProductLines::OutboundJobId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboundProductLines::SkuId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboundProductLines::RequiredQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OutboundProductLines::AllocatedQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OutboundProductLines::PickedQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OutboundProductLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboundProductLines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_outbound_product_lines_job")
                                .from(
                                    OutboundProductLines::Table,
                                    OutboundProductLines::OutboundJobId,
                                )
                                .to(OutboundJobs::Table, OutboundJobs::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OutboundProductLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OutboundJobs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InboundProductLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InboundJobs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InboundJobs {
        Table,
        Id,
        TenantId,
        JobCode,
        CustomerId,
        WarehouseId,
        Status,
        ExpectedDate,
        CustomerName,
        DeliveryAddressLine1,
        DeliveryAddressLine2,
        DeliveryCity,
        DeliveryState,
        DeliveryPostcode,
        DeliveryCountry,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InboundProductLines {
        Table,
        Id,
        TenantId,
        InboundJobId,
        SkuId,
        ExpectedQty,
        ReceivedQty,
        PutAwayQty,
        BatchNumber,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OutboundJobs {
        Table,
        Id,
        TenantId,
        JobCode,
        CustomerId,
        WarehouseId,
        Status,
        RequiredDate,
        ConsigneeName,
        ConsigneeEmail,
        ConsigneePhone,
        ConsigneeAddressLine1,
        ConsigneeAddressLine2,
        ConsigneeCity,
        ConsigneeState,
        ConsigneePostcode,
        ConsigneeCountry,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OutboundProductLines {
        Table,
        Id,
        TenantId,
        OutboundJobId,
        SkuId,
        RequiredQty,
        AllocatedQty,
        PickedQty,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000005_create_container_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_container_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ContainerBookings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ContainerBookings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ContainerBookings::TenantId).uuid().not_null())
                        .col(ColumnDef::new(ContainerBookings::JobType).string().not_null())
                        .col(
                            ColumnDef::new(ContainerBookings::BookingCode)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ContainerBookings::Status).string().not_null())
                        .col(ColumnDef::new(ContainerBookings::ChargeToKind).string().null())
                        .col(ColumnDef::new(ContainerBookings::ChargeToId).uuid().null())
                        .col(ColumnDef::new(ContainerBookings::ChargeToName).string().null())
                        .col(ColumnDef::new(ContainerBookings::ChargeToEmail).string().null())
                        .col(
                            ColumnDef::new(ContainerBookings::ChargeToAddress)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(ContainerBookings::Vessel).string().null())
                        .col(ColumnDef::new(ContainerBookings::Voyage).string().null())
                        .col(
                            ColumnDef::new(ContainerBookings::Eta)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ContainerBookings::Etd)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(ContainerBookings::Notes).string().null())
                        .col(
                            ColumnDef::new(ContainerBookings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ContainerBookings::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ContainerDetails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ContainerDetails::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ContainerDetails::TenantId).uuid().not_null())
                        .col(ColumnDef::new(ContainerDetails::BookingId).uuid().not_null())
                        .col(ColumnDef::new(ContainerDetails::JobType).string().not_null())
                        .col(
                            ColumnDef::new(ContainerDetails::ContainerNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ContainerDetails::ContainerSize)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ContainerDetails::Sequence)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ContainerDetails::Status).string().not_null())
                        .col(ColumnDef::new(ContainerDetails::WarehouseId).uuid().null())
                        .col(
                            ColumnDef::new(ContainerDetails::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ContainerDetails::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_container_details_booking")
                                .from(ContainerDetails::Table, ContainerDetails::BookingId)
                                .to(ContainerBookings::Table, ContainerBookings::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_container_details_booking_id")
                        .table(ContainerDetails::Table)
                        .col(ContainerDetails::BookingId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StockAllocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockAllocations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockAllocations::TenantId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockAllocations::ContainerDetailId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockAllocations::JobType).string().not_null())
                        .col(ColumnDef::new(StockAllocations::InboundJobId).uuid().null())
                        .col(ColumnDef::new(StockAllocations::OutboundJobId).uuid().null())
                        .col(
                            ColumnDef::new(StockAllocations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockAllocations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_allocations_container")
                                .from(StockAllocations::Table, StockAllocations::ContainerDetailId)
                                .to(ContainerDetails::Table, ContainerDetails::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AllocationLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AllocationLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AllocationLines::TenantId).uuid().not_null())
                        .col(
                            ColumnDef::new(AllocationLines::StockAllocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AllocationLines::SkuId).uuid().not_null())
                        .col(
                            ColumnDef::new(AllocationLines::ExpectedQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(AllocationLines::ReceivedQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(AllocationLines::AllocatedQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(AllocationLines::PickedQty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(AllocationLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AllocationLines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_allocation_lines_allocation")
                                .from(AllocationLines::Table, AllocationLines::StockAllocationId)
                                .to(StockAllocations::Table, StockAllocations::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AllocationLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StockAllocations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ContainerDetails::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ContainerBookings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ContainerBookings {
        Table,
        Id,
        TenantId,
        JobType,
        BookingCode,
        Status,
        ChargeToKind,
        ChargeToId,
        ChargeToName,
        ChargeToEmail,
        ChargeToAddress,
        Vessel,
        Voyage,
        Eta,
        Etd,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ContainerDetails {
        Table,
        Id,
        TenantId,
        BookingId,
        JobType,
        ContainerNumber,
        ContainerSize,
        Sequence,
        Status,
        WarehouseId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum StockAllocations {
        Table,
        Id,
        TenantId,
        ContainerDetailId,
        JobType,
        InboundJobId,
        OutboundJobId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum AllocationLines {
        Table,
        Id,
        TenantId,
        StockAllocationId,
        SkuId,
        ExpectedQty,
        ReceivedQty,
        AllocatedQty,
        PickedQty,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000006_create_stock_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_stock_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PutAwayStock::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PutAwayStock::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PutAwayStock::TenantId).uuid().not_null())
                        .col(ColumnDef::new(PutAwayStock::LpnNumber).string().not_null())
                        .col(ColumnDef::new(PutAwayStock::WarehouseId).uuid().null())
                        .col(ColumnDef::new(PutAwayStock::Location).string().null())
                        .col(ColumnDef::new(PutAwayStock::SkuId).uuid().null())
                        .col(
                            ColumnDef::new(PutAwayStock::Qty)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(PutAwayStock::InboundJobId).uuid().null())
                        .col(
                            ColumnDef::new(PutAwayStock::InboundProductLineId)
                                .uuid()
                                .null(),
                        )
                        .col(ColumnDef::new(PutAwayStock::ContainerDetailId).uuid().null())
                        .col(ColumnDef::new(PutAwayStock::OutboundJobId).uuid().null())
                        .col(
                            ColumnDef::new(PutAwayStock::OutboundProductLineId)
                                .uuid()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PutAwayStock::AllocationStatus)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PutAwayStock::IsDeleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PutAwayStock::DeletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PutAwayStock::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PutAwayStock::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_put_away_stock_tenant_lpn")
                        .table(PutAwayStock::Table)
                        .col(PutAwayStock::TenantId)
                        .col(PutAwayStock::LpnNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_put_away_stock_container_detail")
                        .table(PutAwayStock::Table)
                        .col(PutAwayStock::ContainerDetailId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PickupRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PickupRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PickupRecords::TenantId).uuid().not_null())
                        .col(
                            ColumnDef::new(PickupRecords::ContainerDetailId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PickupRecords::OutboundJobId).uuid().null())
                        .col(ColumnDef::new(PickupRecords::Status).string().not_null())
                        .col(
                            ColumnDef::new(PickupRecords::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(PickupRecords::Notes).string().null())
                        .col(
                            ColumnDef::new(PickupRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PickupRecords::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(FleetAssets::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FleetAssets::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FleetAssets::TenantId).uuid().not_null())
                        .col(ColumnDef::new(FleetAssets::AssetType).string().not_null())
                        .col(ColumnDef::new(FleetAssets::Registration).string().not_null())
                        .col(ColumnDef::new(FleetAssets::Name).string().null())
                        .col(ColumnDef::new(FleetAssets::Status).string().not_null())
                        .col(
                            ColumnDef::new(FleetAssets::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FleetAssets::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FleetAssets::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PickupRecords::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PutAwayStock::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PutAwayStock {
        Table,
        Id,
        TenantId,
        LpnNumber,
        WarehouseId,
        Location,
        SkuId,
        Qty,
        InboundJobId,
        InboundProductLineId,
        ContainerDetailId,
        OutboundJobId,
        OutboundProductLineId,
        AllocationStatus,
        IsDeleted,
        DeletedAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PickupRecords {
        Table,
        Id,
        TenantId,
        ContainerDetailId,
        OutboundJobId,
        Status,
        CompletedAt,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum FleetAssets {
        Table,
        Id,
        TenantId,
        AssetType,
        Registration,
        Name,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

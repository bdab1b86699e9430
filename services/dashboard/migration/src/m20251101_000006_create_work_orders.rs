use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WorkOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkOrders::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WorkOrders::Code)
                            .string_len(16)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(WorkOrders::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(WorkOrders::VehicleId).uuid().not_null())
                    .col(ColumnDef::new(WorkOrders::ShopId).uuid().not_null())
                    .col(ColumnDef::new(WorkOrders::CreatedByUserId).uuid().not_null())
                    .col(
                        ColumnDef::new(WorkOrders::Status)
                            .string_len(32)
                            .not_null()
                            .default("waiting_for_inspection")
                            .check(Expr::col(WorkOrders::Status).is_in([
                                "waiting_for_inspection",
                                "in_progress",
                                "completed",
                                "follow_up_needed",
                                "awaiting_info",
                            ])),
                    )
                    .col(ColumnDef::new(WorkOrders::DamageDate).date().null())
                    .col(
                        ColumnDef::new(WorkOrders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(WorkOrders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(WorkOrders::Table, WorkOrders::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(WorkOrders::Table, WorkOrders::VehicleId)
                            .to(Vehicles::Table, Vehicles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(WorkOrders::Table, WorkOrders::ShopId)
                            .to(Shops::Table, Shops::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(WorkOrders::Table, WorkOrders::CreatedByUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_work_orders_shop_id_created_at")
                    .table(WorkOrders::Table)
                    .col(WorkOrders::ShopId)
                    .col(WorkOrders::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkOrders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum WorkOrders {
    Table,
    Id,
    Code,
    CustomerId,
    VehicleId,
    ShopId,
    CreatedByUserId,
    Status,
    DamageDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Customers {
    Table,
    Id,
}

#[derive(Iden)]
enum Vehicles {
    Table,
    Id,
}

#[derive(Iden)]
enum Shops {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

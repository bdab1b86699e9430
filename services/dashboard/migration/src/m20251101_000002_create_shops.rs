use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shops::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shops::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Shops::Code)
                            .string_len(10)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Shops::ShopName).string().not_null())
                    .col(
                        ColumnDef::new(Shops::Status)
                            .string_len(16)
                            .not_null()
                            .default("active")
                            .check(Expr::col(Shops::Status).is_in(["active", "inactive"])),
                    )
                    .col(ColumnDef::new(Shops::Address).string().not_null())
                    .col(ColumnDef::new(Shops::City).string().not_null())
                    .col(ColumnDef::new(Shops::Province).string_len(2).not_null())
                    .col(ColumnDef::new(Shops::PostalCode).string_len(6).not_null())
                    .col(ColumnDef::new(Shops::ContactName).string().not_null())
                    .col(ColumnDef::new(Shops::Phone).string_len(12).not_null())
                    .col(ColumnDef::new(Shops::Email).string().not_null())
                    .col(
                        ColumnDef::new(Shops::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Shops::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shops::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Shops {
    Table,
    Id,
    Code,
    ShopName,
    Status,
    Address,
    City,
    Province,
    PostalCode,
    ContactName,
    Phone,
    Email,
    CreatedAt,
    UpdatedAt,
}

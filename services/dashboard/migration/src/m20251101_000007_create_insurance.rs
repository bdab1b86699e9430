use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Insurance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Insurance::WorkOrderId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Insurance::InsuranceCompany).string().null())
                    .col(ColumnDef::new(Insurance::AgentFirstName).string().null())
                    .col(ColumnDef::new(Insurance::AgentLastName).string().null())
                    .col(ColumnDef::new(Insurance::AgentPhone).string_len(12).null())
                    .col(ColumnDef::new(Insurance::PolicyNumber).string().null())
                    .col(ColumnDef::new(Insurance::ClaimNumber).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Insurance::Table, Insurance::WorkOrderId)
                            .to(WorkOrders::Table, WorkOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Insurance::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Insurance {
    Table,
    WorkOrderId,
    InsuranceCompany,
    AgentFirstName,
    AgentLastName,
    AgentPhone,
    PolicyNumber,
    ClaimNumber,
}

#[derive(Iden)]
enum WorkOrders {
    Table,
    Id,
}

use sea_orm_migration::prelude::*;

mod m20251101_000001_create_roles;
mod m20251101_000002_create_shops;
mod m20251101_000003_create_users;
mod m20251101_000004_create_customers;
mod m20251101_000005_create_vehicles;
mod m20251101_000006_create_work_orders;
mod m20251101_000007_create_insurance;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251101_000001_create_roles::Migration),
            Box::new(m20251101_000002_create_shops::Migration),
            Box::new(m20251101_000003_create_users::Migration),
            Box::new(m20251101_000004_create_customers::Migration),
            Box::new(m20251101_000005_create_vehicles::Migration),
            Box::new(m20251101_000006_create_work_orders::Migration),
            Box::new(m20251101_000007_create_insurance::Migration),
        ]
    }
}

use sea_orm_migration::prelude::*;

use havenz_dashboard_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(rately_api_migration::Migrator).await;
}

use sea_orm_migration::prelude::*;

mod m20260601_000001_create_roles;
mod m20260601_000002_create_users;
mod m20260601_000003_create_devices;
mod m20260601_000004_create_refresh_tokens;
mod m20260601_000005_create_verification_codes;
mod m20260601_000006_seed_roles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_create_roles::Migration),
            Box::new(m20260601_000002_create_users::Migration),
            Box::new(m20260601_000003_create_devices::Migration),
            Box::new(m20260601_000004_create_refresh_tokens::Migration),
            Box::new(m20260601_000005_create_verification_codes::Migration),
            Box::new(m20260601_000006_seed_roles::Migration),
        ]
    }
}

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}

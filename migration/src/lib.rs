pub use sea_orm_migration::prelude::*;

mod m20221001_000001_create_sync_status;
mod m20221001_000002_create_recent_blocks_and_transactions;
mod m20221001_000003_create_balanced_tables;
mod m20221001_000004_create_icx_snapshot_tables;
mod m20221001_000005_create_github_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20221001_000001_create_sync_status::Migration),
            Box::new(m20221001_000002_create_recent_blocks_and_transactions::Migration),
            Box::new(m20221001_000003_create_balanced_tables::Migration),
            Box::new(m20221001_000004_create_icx_snapshot_tables::Migration),
            Box::new(m20221001_000005_create_github_tables::Migration),
        ]
    }
}

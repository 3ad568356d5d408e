pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_users_table;
mod m20261001_000002_create_pets_tables;
mod m20261001_000003_create_placement_requests_table;
mod m20261001_000004_create_placement_request_responses_table;
mod m20261001_000005_create_transfer_requests_table;
mod m20261001_000006_create_relationship_tables;
mod m20261001_000007_create_chats_table;
mod m20261001_000008_add_placement_indexes;
mod m20261001_000009_add_transfer_expires_at;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_users_table::Migration),
            Box::new(m20261001_000002_create_pets_tables::Migration),
            Box::new(m20261001_000003_create_placement_requests_table::Migration),
            Box::new(m20261001_000004_create_placement_request_responses_table::Migration),
            Box::new(m20261001_000005_create_transfer_requests_table::Migration),
            Box::new(m20261001_000006_create_relationship_tables::Migration),
            Box::new(m20261001_000007_create_chats_table::Migration),
            Box::new(m20261001_000008_add_placement_indexes::Migration),
            Box::new(m20261001_000009_add_transfer_expires_at::Migration),
        ]
    }
}

pub use sea_orm_migration::prelude::*;

mod m20261005_000001_create_app_users;
mod m20261005_000002_create_sources;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261005_000001_create_app_users::Migration),
            Box::new(m20261005_000002_create_sources::Migration),
        ]
    }
}

pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_contest_tables;
mod m20250903_000001_add_winner_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_contest_tables::Migration),
            Box::new(m20250903_000001_add_winner_indexes::Migration),
        ]
    }
}

pub use sea_orm_migration::prelude::*;

mod m20260114_000001_create_movie_cache;
mod m20260115_000001_create_favorite_movie;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260114_000001_create_movie_cache::Migration),
            Box::new(m20260115_000001_create_favorite_movie::Migration),
        ]
    }
}

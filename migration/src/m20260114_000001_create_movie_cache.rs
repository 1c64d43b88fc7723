use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MovieCache::Table)
                    .if_not_exists()
                    .col(big_integer(MovieCache::Id).primary_key())
                    .col(integer(MovieCache::Position))
                    .col(string(MovieCache::Title))
                    .col(text(MovieCache::Overview))
                    .col(string(MovieCache::PosterPath))
                    .col(string(MovieCache::ReleaseDate))
                    .col(double(MovieCache::Popularity))
                    .col(double(MovieCache::VoteAverage))
                    .col(big_integer(MovieCache::VoteCount))
                    .col(big_integer(MovieCache::CachedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_cache_position")
                    .table(MovieCache::Table)
                    .col(MovieCache::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MovieCache::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum MovieCache {
    Table,
    Id,
    Position,
    Title,
    Overview,
    PosterPath,
    ReleaseDate,
    Popularity,
    VoteAverage,
    VoteCount,
    CachedAt,
}

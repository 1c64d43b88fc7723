use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FavoriteMovie::Table)
                    .if_not_exists()
                    .col(big_integer(FavoriteMovie::Id).primary_key())
                    .col(string(FavoriteMovie::Title))
                    .col(text(FavoriteMovie::Overview))
                    .col(string(FavoriteMovie::PosterPath))
                    .col(string(FavoriteMovie::ReleaseDate))
                    .col(double(FavoriteMovie::Popularity))
                    .col(double(FavoriteMovie::VoteAverage))
                    .col(big_integer(FavoriteMovie::VoteCount))
                    .col(big_integer(FavoriteMovie::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_favorite_movie_created_at")
                    .table(FavoriteMovie::Table)
                    .col(FavoriteMovie::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(FavoriteMovie::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum FavoriteMovie {
    Table,
    Id,
    Title,
    Overview,
    PosterPath,
    ReleaseDate,
    Popularity,
    VoteAverage,
    VoteCount,
    CreatedAt,
}

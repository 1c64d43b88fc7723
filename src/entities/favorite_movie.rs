use sea_orm::entity::prelude::*;

/// Snapshot of a movie at the moment it was favorited.
///
/// Independent of `movie_cache`: replacing the cache never touches these rows.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "favorite_movie")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub overview: String,
    pub poster_path: String,
    pub release_date: String,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: i64,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use std::collections::HashSet;

use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
    Set, TransactionTrait, sea_query::OnConflict,
};

use crate::{
    entities::{favorite_movie, movie_cache},
    error::AppResult,
    models::{Favorite, Movie},
};

/// Persistent side of the repository: the cached first page of the popular
/// feed and the favorites set. The two tables never reference each other.
#[derive(Clone)]
pub struct LocalStore {
    db: DatabaseConnection,
}

impl LocalStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn all_cached_movies(&self) -> AppResult<Vec<Movie>> {
        let rows = movie_cache::Entity::find()
            .order_by_asc(movie_cache::Column::Position)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(movie_from_row).collect())
    }

    pub async fn cached_movie(&self, id: i64) -> AppResult<Option<Movie>> {
        let row = movie_cache::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(movie_from_row))
    }

    /// Clears the cache and inserts `movies` in one transaction, so readers
    /// see either the old page or the new one.
    pub async fn replace_cached_movies(&self, movies: &[Movie]) -> AppResult<()> {
        let mut seen = HashSet::new();
        let models: Vec<_> = movies
            .iter()
            .filter(|m| seen.insert(m.id))
            .enumerate()
            .map(|(position, m)| movie_cache::ActiveModel {
                id: Set(m.id),
                position: Set(position as i32),
                title: Set(m.title.clone()),
                overview: Set(m.overview.clone()),
                poster_path: Set(m.poster_path.clone()),
                release_date: Set(m.release_date.clone()),
                popularity: Set(m.popularity),
                vote_average: Set(m.vote_average),
                vote_count: Set(m.vote_count),
                cached_at: Set(m.cached_at),
            })
            .collect();

        let txn = self.db.begin().await?;

        movie_cache::Entity::delete_many().exec(&txn).await?;
        if !models.is_empty() {
            movie_cache::Entity::insert_many(models).exec_without_returning(&txn).await?;
        }

        txn.commit().await?;

        Ok(())
    }

    pub async fn clear_cached_movies(&self) -> AppResult<()> {
        movie_cache::Entity::delete_many().exec(&self.db).await?;
        Ok(())
    }

    /// Favorites, most recently added first.
    pub async fn list_favorites(&self) -> AppResult<Vec<Favorite>> {
        let rows = favorite_movie::Entity::find()
            .order_by_desc(favorite_movie::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(favorite_from_row).collect())
    }

    pub async fn add_favorite(&self, favorite: &Favorite) -> AppResult<()> {
        insert_favorite(&self.db, favorite).await
    }

    pub async fn remove_favorite(&self, id: i64) -> AppResult<()> {
        favorite_movie::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn is_favorite(&self, id: i64) -> AppResult<bool> {
        is_favorite(&self.db, id).await
    }

    pub async fn favorite_ids(&self) -> AppResult<HashSet<i64>> {
        let ids: Vec<i64> = favorite_movie::Entity::find()
            .select_only()
            .column(favorite_movie::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids.into_iter().collect())
    }

    /// Flips membership of `favorite.id` inside one transaction and returns
    /// whether the movie is a favorite afterwards.
    pub async fn toggle_favorite(&self, favorite: &Favorite) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        let now_favorite = if is_favorite(&txn, favorite.id).await? {
            favorite_movie::Entity::delete_by_id(favorite.id).exec(&txn).await?;
            false
        } else {
            insert_favorite(&txn, favorite).await?;
            true
        };

        txn.commit().await?;

        Ok(now_favorite)
    }
}

async fn is_favorite(conn: &impl ConnectionTrait, id: i64) -> AppResult<bool> {
    let count = favorite_movie::Entity::find_by_id(id).count(conn).await?;
    Ok(count > 0)
}

async fn insert_favorite(conn: &impl ConnectionTrait, favorite: &Favorite) -> AppResult<()> {
    let model = favorite_movie::ActiveModel {
        id: Set(favorite.id),
        title: Set(favorite.title.clone()),
        overview: Set(favorite.overview.clone()),
        poster_path: Set(favorite.poster_path.clone()),
        release_date: Set(favorite.release_date.clone()),
        popularity: Set(favorite.popularity),
        vote_average: Set(favorite.vote_average),
        vote_count: Set(favorite.vote_count),
        created_at: Set(favorite.created_at),
    };

    favorite_movie::Entity::insert(model)
        .on_conflict(
            OnConflict::column(favorite_movie::Column::Id)
                .update_columns([
                    favorite_movie::Column::Title,
                    favorite_movie::Column::Overview,
                    favorite_movie::Column::PosterPath,
                    favorite_movie::Column::ReleaseDate,
                    favorite_movie::Column::Popularity,
                    favorite_movie::Column::VoteAverage,
                    favorite_movie::Column::VoteCount,
                    favorite_movie::Column::CreatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

fn movie_from_row(row: movie_cache::Model) -> Movie {
    Movie {
        id: row.id,
        title: row.title,
        overview: row.overview,
        poster_path: row.poster_path,
        release_date: row.release_date,
        popularity: row.popularity,
        vote_average: row.vote_average,
        vote_count: row.vote_count,
        is_favorite: false,
        cached_at: row.cached_at,
    }
}

fn favorite_from_row(row: favorite_movie::Model) -> Favorite {
    Favorite {
        id: row.id,
        title: row.title,
        overview: row.overview,
        poster_path: row.poster_path,
        release_date: row.release_date,
        popularity: row.popularity,
        vote_average: row.vote_average,
        vote_count: row.vote_count,
        created_at: row.created_at,
    }
}

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    error::AppResult,
    models::{Favorite, Movie, MovieDetail, MoviePage, PageSource},
    store::LocalStore,
    tmdb::{RemotePage, RemoteSource},
};

/// Everything the view-state machines need from the data layer.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn get_popular_movies(&self, page: u32, force_refresh: bool) -> AppResult<MoviePage>;
    async fn search_movie(&self, query: &str, page: u32) -> AppResult<MoviePage>;
    async fn get_movie_detail(&self, id: i64) -> AppResult<MovieDetail>;
    async fn get_favorites(&self) -> AppResult<Vec<Movie>>;
    /// Flips the favorite state of `movie`, updates its flag and returns the new value.
    async fn toggle_favorite(&self, movie: &mut Movie) -> AppResult<bool>;
}

/// Serves the first popular page from the local cache when it can and
/// reconciles every movie it hands out with the favorites table.
pub struct OfflineFirstRepository {
    remote: Arc<dyn RemoteSource>,
    store: LocalStore,
}

impl OfflineFirstRepository {
    pub fn new(remote: Arc<dyn RemoteSource>, store: LocalStore) -> Self {
        Self { remote, store }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    async fn cached_first_page(&self) -> Option<Vec<Movie>> {
        match self.store.all_cached_movies().await {
            Ok(movies) if !movies.is_empty() => Some(movies),
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "cache read failed, treating as miss");
                None
            },
        }
    }

    async fn favorite_ids(&self) -> HashSet<i64> {
        self.store.favorite_ids().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to read favorites, projecting none");
            HashSet::new()
        })
    }

    async fn project(&self, mut movies: Vec<Movie>) -> Vec<Movie> {
        let favorites = self.favorite_ids().await;
        for movie in &mut movies {
            movie.is_favorite = favorites.contains(&movie.id);
        }
        movies
    }

    async fn remote_page(&self, page: RemotePage) -> MoviePage {
        let now = now_sec();
        let movies = page.results.into_iter().map(|m| m.into_movie(now)).collect();
        MoviePage {
            movies: self.project(movies).await,
            current_page: page.page,
            total_pages: page.total_pages,
            source: PageSource::Remote,
        }
    }
}

#[async_trait]
impl MovieRepository for OfflineFirstRepository {
    async fn get_popular_movies(&self, page: u32, force_refresh: bool) -> AppResult<MoviePage> {
        if page == 1 && !force_refresh {
            if let Some(cached) = self.cached_first_page().await {
                debug!(count = cached.len(), "serving popular movies from cache");
                return Ok(MoviePage::cached(self.project(cached).await));
            }
        }

        debug!(page, force_refresh, "fetching popular movies");
        let remote = self.remote.fetch_popular(page).await?;
        let result = self.remote_page(remote).await;

        if page == 1 {
            if let Err(err) = self.store.replace_cached_movies(&result.movies).await {
                warn!(error = %err, "failed to replace movie cache");
            }
        }

        Ok(result)
    }

    async fn search_movie(&self, query: &str, page: u32) -> AppResult<MoviePage> {
        debug!(query, page, "searching movies");
        let remote = self.remote.search(query, page).await?;
        Ok(self.remote_page(remote).await)
    }

    async fn get_movie_detail(&self, id: i64) -> AppResult<MovieDetail> {
        self.remote.fetch_detail(id).await
    }

    async fn get_favorites(&self) -> AppResult<Vec<Movie>> {
        let favorites = self.store.list_favorites().await?;
        Ok(favorites.into_iter().map(Favorite::into_movie).collect())
    }

    async fn toggle_favorite(&self, movie: &mut Movie) -> AppResult<bool> {
        let snapshot = Favorite::snapshot(movie, now_micros());
        let is_favorite = self.store.toggle_favorite(&snapshot).await?;
        debug!(id = movie.id, is_favorite, "toggled favorite");
        movie.is_favorite = is_favorite;
        Ok(is_favorite)
    }
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

fn now_micros() -> i64 {
    jiff::Timestamp::now().as_microsecond()
}

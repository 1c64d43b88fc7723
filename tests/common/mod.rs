//! Shared test utilities: temp databases, a fake TMDB source and a scripted repository.

#![allow(dead_code, unused_imports)]

pub mod mock_tmdb;

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use moviedeck::{
    db,
    error::{AppError, AppResult},
    models::{Movie, MovieDetail, MoviePage, PageSource},
    repository::{MovieRepository, OfflineFirstRepository},
    store::LocalStore,
    tmdb::{RemoteMovie, RemotePage, RemoteSource},
};
use tempfile::TempDir;

// -- Builders -----------------------------------------------------------------

pub fn movie(id: i64, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        overview: format!("{title} overview"),
        poster_path: format!("/{id}.jpg"),
        release_date: "2008-04-30".to_string(),
        popularity: 10.0,
        vote_average: 7.5,
        vote_count: 100,
        is_favorite: false,
        cached_at: 0,
    }
}

pub fn remote_movie(id: i64, title: &str) -> RemoteMovie {
    RemoteMovie {
        id,
        title: title.to_string(),
        overview: format!("{title} overview"),
        poster_path: Some(format!("/{id}.jpg")),
        release_date: Some("2008-04-30".to_string()),
        popularity: 10.0,
        vote_average: 7.5,
        vote_count: 100,
    }
}

pub fn remote_page(page: u32, total_pages: u32, movies: &[(i64, &str)]) -> RemotePage {
    RemotePage {
        page,
        results: movies.iter().map(|(id, title)| remote_movie(*id, title)).collect(),
        total_pages,
        total_results: total_pages * 20,
    }
}

pub fn movie_page(current_page: u32, total_pages: u32, movies: &[(i64, &str)]) -> MoviePage {
    MoviePage {
        movies: movies.iter().map(|(id, title)| movie(*id, title)).collect(),
        current_page,
        total_pages,
        source: PageSource::Remote,
    }
}

// -- Database -----------------------------------------------------------------

/// A migrated SQLite database in a temp dir. Keep the `TempDir` alive.
pub async fn temp_store() -> (TempDir, LocalStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let conn = db::connect_and_migrate(&url).await.expect("Failed to open test database");
    (dir, LocalStore::new(conn))
}

pub async fn repository_with(remote: Arc<FakeRemote>) -> (TempDir, OfflineFirstRepository) {
    let (dir, store) = temp_store().await;
    (dir, OfflineFirstRepository::new(remote, store))
}

// -- Fake remote --------------------------------------------------------------

/// Serves canned pages and counts calls. Unknown pages fail with a 404.
#[derive(Default)]
pub struct FakeRemote {
    popular: Mutex<HashMap<u32, RemotePage>>,
    search: Mutex<HashMap<(String, u32), RemotePage>>,
    detail: Mutex<Option<MovieDetail>>,
    fail_status: Mutex<Option<u16>>,
    pub popular_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_popular(&self, page: RemotePage) {
        self.popular.lock().unwrap().insert(page.page, page);
    }

    pub fn set_search(&self, query: &str, page: RemotePage) {
        self.search.lock().unwrap().insert((query.to_string(), page.page), page);
    }

    pub fn set_detail(&self, detail: MovieDetail) {
        *self.detail.lock().unwrap() = Some(detail);
    }

    pub fn fail_with(&self, status: u16) {
        *self.fail_status.lock().unwrap() = Some(status);
    }

    pub fn popular_calls(&self) -> usize {
        self.popular_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> AppResult<()> {
        match *self.fail_status.lock().unwrap() {
            Some(status) => Err(AppError::Server { status }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteSource for FakeRemote {
    async fn fetch_popular(&self, page: u32) -> AppResult<RemotePage> {
        self.popular_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.popular.lock().unwrap().get(&page).cloned().ok_or(AppError::Server { status: 404 })
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<RemotePage> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.search
            .lock()
            .unwrap()
            .get(&(query.to_string(), page))
            .cloned()
            .ok_or(AppError::Server { status: 404 })
    }

    async fn fetch_detail(&self, _id: i64) -> AppResult<MovieDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.detail.lock().unwrap().clone().ok_or(AppError::Server { status: 404 })
    }
}

// -- Scripted repository ------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Popular { page: u32, force_refresh: bool },
    Search { query: String, page: u32 },
    Detail(i64),
    Favorites,
    Toggle(i64),
}

/// Repository double for the state machines. Page results are queued in
/// order; favorites live in memory; any call can be made to fail.
#[derive(Default)]
pub struct MockRepository {
    pages: Mutex<VecDeque<AppResult<MoviePage>>>,
    detail: Mutex<Option<MovieDetail>>,
    favorites: Mutex<Vec<Movie>>,
    fail_favorites: Mutex<Option<u16>>,
    fail_toggle: Mutex<Option<u16>>,
    panic_next_page: AtomicBool,
    calls: Mutex<Vec<Call>>,
}

impl MockRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_page(&self, page: MoviePage) {
        self.pages.lock().unwrap().push_back(Ok(page));
    }

    pub fn push_failure(&self, status: u16) {
        self.pages.lock().unwrap().push_back(Err(AppError::Server { status }));
    }

    pub fn set_detail(&self, detail: MovieDetail) {
        *self.detail.lock().unwrap() = Some(detail);
    }

    pub fn set_favorites(&self, favorites: Vec<Movie>) {
        *self.favorites.lock().unwrap() = favorites;
    }

    pub fn fail_favorites(&self, status: u16) {
        *self.fail_favorites.lock().unwrap() = Some(status);
    }

    pub fn fail_toggle(&self, status: u16) {
        *self.fail_toggle.lock().unwrap() = Some(status);
    }

    /// The next page request panics instead of answering.
    pub fn panic_next_page(&self) {
        self.panic_next_page.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_page(&self) -> AppResult<MoviePage> {
        if self.panic_next_page.swap(false, Ordering::SeqCst) {
            panic!("scripted repository panic");
        }
        self.pages.lock().unwrap().pop_front().unwrap_or(Err(AppError::Server { status: 404 }))
    }
}

#[async_trait]
impl MovieRepository for MockRepository {
    async fn get_popular_movies(&self, page: u32, force_refresh: bool) -> AppResult<MoviePage> {
        self.record(Call::Popular { page, force_refresh });
        self.next_page()
    }

    async fn search_movie(&self, query: &str, page: u32) -> AppResult<MoviePage> {
        self.record(Call::Search { query: query.to_string(), page });
        self.next_page()
    }

    async fn get_movie_detail(&self, id: i64) -> AppResult<MovieDetail> {
        self.record(Call::Detail(id));
        self.detail.lock().unwrap().clone().ok_or(AppError::Server { status: 404 })
    }

    async fn get_favorites(&self) -> AppResult<Vec<Movie>> {
        self.record(Call::Favorites);
        if let Some(status) = *self.fail_favorites.lock().unwrap() {
            return Err(AppError::Server { status });
        }
        Ok(self.favorites.lock().unwrap().clone())
    }

    async fn toggle_favorite(&self, movie: &mut Movie) -> AppResult<bool> {
        self.record(Call::Toggle(movie.id));
        if let Some(status) = *self.fail_toggle.lock().unwrap() {
            return Err(AppError::Server { status });
        }
        let mut favorites = self.favorites.lock().unwrap();
        let now_favorite = if let Some(pos) = favorites.iter().position(|m| m.id == movie.id) {
            favorites.remove(pos);
            false
        } else {
            favorites.insert(0, Movie { is_favorite: true, ..movie.clone() });
            true
        };
        movie.is_favorite = now_favorite;
        Ok(now_favorite)
    }
}

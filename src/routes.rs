use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use tokio::sync::Mutex;

use crate::{
    error::AppResult,
    models::MovieDetail,
    repository::MovieRepository,
    viewmodel::{
        Store,
        favorites::{FavoritesAction, FavoritesReducer, FavoritesState},
        list::{ListAction, ListReducer, ListState},
    },
};

/// One list and one favorites state machine shared by every request.
/// The mutexes make each machine single-writer.
pub struct AppState {
    pub repository: Arc<dyn MovieRepository>,
    pub list: Mutex<Store<ListReducer>>,
    pub favorites: Mutex<Store<FavoritesReducer>>,
}

impl AppState {
    pub fn new(repository: Arc<dyn MovieRepository>) -> Self {
        Self {
            list: Mutex::new(Store::new(repository.clone())),
            favorites: Mutex::new(Store::new(repository.clone())),
            repository,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/movies", get(list_state))
        .route("/movies/actions", axum::routing::post(list_action))
        .route("/movies/{id}", get(movie_detail))
        .route("/favorites", get(favorites_state))
        .route("/favorites/actions", axum::routing::post(favorites_action))
        .with_state(state)
}

pub async fn list_state(State(state): State<Arc<AppState>>) -> Json<ListState> {
    Json(state.list.lock().await.state().clone())
}

pub async fn list_action(
    State(state): State<Arc<AppState>>,
    Json(action): Json<ListAction>,
) -> Json<ListState> {
    let mut list = state.list.lock().await;
    list.send(action);
    list.settle().await;
    Json(list.state().clone())
}

pub async fn favorites_state(State(state): State<Arc<AppState>>) -> Json<FavoritesState> {
    Json(state.favorites.lock().await.state().clone())
}

pub async fn favorites_action(
    State(state): State<Arc<AppState>>,
    Json(action): Json<FavoritesAction>,
) -> Json<FavoritesState> {
    let mut favorites = state.favorites.lock().await;
    favorites.send(action);
    favorites.settle().await;
    Json(favorites.state().clone())
}

pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> AppResult<Json<MovieDetail>> {
    Ok(Json(state.repository.get_movie_detail(id).await?))
}

//! Popular feed and search, with pagination and pull-to-refresh.

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Effect, Intent, Reducer, UiState};
use crate::{
    models::{Movie, MoviePage},
    repository::MovieRepository,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ListState {
    pub movies: Vec<Movie>,
    pub is_loading: bool,
    pub is_fetching_more: bool,
    pub has_loaded: bool,
    pub search_text: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub error_message: Option<String>,
    /// Bumped by every first-page request. Page results issued under an
    /// older generation are dropped.
    pub generation: u64,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            movies: Vec::new(),
            is_loading: false,
            is_fetching_more: false,
            has_loaded: false,
            search_text: String::new(),
            current_page: 1,
            total_pages: 1,
            error_message: None,
            generation: 0,
        }
    }
}

impl ListState {
    pub fn can_load_more(&self) -> bool {
        !self.is_loading && !self.is_fetching_more && self.current_page < self.total_pages
    }

    fn is_searching(&self) -> bool {
        !self.search_text.is_empty()
    }
}

impl UiState for ListState {}

/// What the host can ask of the list screen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ListAction {
    OnAppear,
    Refresh,
    SearchTextChanged(String),
    SearchMovie,
    Reset,
    LoadMore,
    DismissError,
    ToggleFavorite(Movie),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListIntent {
    Action(ListAction),
    PageLoaded { generation: u64, append: bool, page: MoviePage },
    PageFailed { generation: u64, append: bool, message: String },
    FavoritesSynced(HashSet<i64>),
    FavoriteToggled { id: i64, is_favorite: bool },
    Failed(String),
}

impl Intent for ListIntent {}

impl From<ListAction> for ListIntent {
    fn from(action: ListAction) -> Self {
        ListIntent::Action(action)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum PageRequest {
    Popular { page: u32, force_refresh: bool },
    Search { query: String, page: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListCommand {
    LoadPage { request: PageRequest, generation: u64, append: bool },
    SyncFavorites,
    ToggleFavorite(Movie),
}

pub struct ListReducer;

impl ListReducer {
    fn first_page(mut state: ListState, request: PageRequest) -> (ListState, Vec<ListCommand>) {
        state.generation += 1;
        state.is_loading = true;
        state.is_fetching_more = false;
        state.error_message = None;
        let generation = state.generation;
        (state, vec![ListCommand::LoadPage { request, generation, append: false }])
    }

    fn popular_first_page(state: ListState, force_refresh: bool) -> (ListState, Vec<ListCommand>) {
        Self::first_page(state, PageRequest::Popular { page: 1, force_refresh })
    }

    fn search_first_page(state: ListState) -> (ListState, Vec<ListCommand>) {
        let query = state.search_text.clone();
        Self::first_page(state, PageRequest::Search { query, page: 1 })
    }

    fn reset(mut state: ListState) -> (ListState, Vec<ListCommand>) {
        state.search_text.clear();
        Self::popular_first_page(state, false)
    }

    fn load_more(mut state: ListState) -> (ListState, Vec<ListCommand>) {
        if !state.can_load_more() {
            return (state, Vec::new());
        }

        let page = state.current_page + 1;
        let request = if state.is_searching() {
            PageRequest::Search { query: state.search_text.clone(), page }
        } else {
            PageRequest::Popular { page, force_refresh: false }
        };

        state.is_fetching_more = true;
        let command = ListCommand::LoadPage { request, generation: state.generation, append: true };
        (state, vec![command])
    }

    fn reduce_action(mut state: ListState, action: ListAction) -> (ListState, Vec<ListCommand>) {
        match action {
            ListAction::OnAppear => {
                if state.has_loaded {
                    return (state, vec![ListCommand::SyncFavorites]);
                }
                state.has_loaded = true;
                Self::popular_first_page(state, false)
            },
            ListAction::Refresh => {
                if state.is_searching() {
                    Self::search_first_page(state)
                } else {
                    Self::popular_first_page(state, true)
                }
            },
            ListAction::SearchTextChanged(text) => {
                state.search_text = text;
                (state, Vec::new())
            },
            ListAction::SearchMovie => {
                if state.is_searching() {
                    Self::search_first_page(state)
                } else {
                    Self::reset(state)
                }
            },
            ListAction::Reset => Self::reset(state),
            ListAction::LoadMore => Self::load_more(state),
            ListAction::DismissError => {
                state.error_message = None;
                (state, Vec::new())
            },
            ListAction::ToggleFavorite(movie) => (state, vec![ListCommand::ToggleFavorite(movie)]),
        }
    }
}

impl Reducer for ListReducer {
    type State = ListState;
    type Intent = ListIntent;
    type Command = ListCommand;

    fn reduce(mut state: ListState, intent: ListIntent) -> (ListState, Vec<ListCommand>) {
        match intent {
            ListIntent::Action(action) => return Self::reduce_action(state, action),
            ListIntent::PageLoaded { generation, .. } | ListIntent::PageFailed { generation, .. }
                if generation != state.generation => {},
            ListIntent::PageLoaded { append: false, page, .. } => {
                state.movies = page.movies;
                state.current_page = page.current_page;
                state.total_pages = page.total_pages;
                state.is_loading = false;
            },
            ListIntent::PageLoaded { append: true, page, .. } => {
                state.movies.extend(page.movies);
                state.current_page = page.current_page;
                state.total_pages = page.total_pages;
                state.is_fetching_more = false;
            },
            ListIntent::PageFailed { append: false, message, .. } => {
                state.movies.clear();
                state.is_loading = false;
                state.error_message = Some(message);
            },
            ListIntent::PageFailed { append: true, message, .. } => {
                state.is_fetching_more = false;
                state.error_message = Some(message);
            },
            ListIntent::FavoritesSynced(favorites) => {
                for movie in &mut state.movies {
                    movie.is_favorite = favorites.contains(&movie.id);
                }
            },
            ListIntent::FavoriteToggled { id, is_favorite } => {
                for movie in state.movies.iter_mut().filter(|m| m.id == id) {
                    movie.is_favorite = is_favorite;
                }
            },
            ListIntent::Failed(message) => state.error_message = Some(message),
        }
        (state, Vec::new())
    }
}

#[async_trait]
impl Effect for ListCommand {
    type Intent = ListIntent;

    async fn run(self, repository: Arc<dyn MovieRepository>) -> ListIntent {
        match self {
            ListCommand::LoadPage { request, generation, append } => {
                let result = match &request {
                    PageRequest::Popular { page, force_refresh } => {
                        repository.get_popular_movies(*page, *force_refresh).await
                    },
                    PageRequest::Search { query, page } => {
                        repository.search_movie(query, *page).await
                    },
                };
                match result {
                    Ok(page) => ListIntent::PageLoaded { generation, append, page },
                    Err(err) => {
                        warn!(?request, error = %err, "failed to load movies");
                        ListIntent::PageFailed { generation, append, message: err.to_string() }
                    },
                }
            },
            ListCommand::SyncFavorites => match repository.get_favorites().await {
                Ok(favorites) => {
                    ListIntent::FavoritesSynced(favorites.iter().map(|m| m.id).collect())
                },
                Err(err) => ListIntent::Failed(err.to_string()),
            },
            ListCommand::ToggleFavorite(mut movie) => {
                match repository.toggle_favorite(&mut movie).await {
                    Ok(is_favorite) => ListIntent::FavoriteToggled { id: movie.id, is_favorite },
                    Err(err) => {
                        warn!(id = movie.id, error = %err, "failed to toggle favorite");
                        ListIntent::Failed(err.to_string())
                    },
                }
            },
        }
    }

    fn failed(&self, message: String) -> ListIntent {
        match self {
            ListCommand::LoadPage { generation, append, .. } => {
                ListIntent::PageFailed { generation: *generation, append: *append, message }
            },
            ListCommand::SyncFavorites | ListCommand::ToggleFavorite(_) => {
                ListIntent::Failed(message)
            },
        }
    }
}

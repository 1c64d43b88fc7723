//! Favorites screen: lists the favorites set and lets the user remove entries.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Effect, Intent, Reducer, UiState};
use crate::{models::Movie, repository::MovieRepository};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FavoritesState {
    pub movies: Vec<Movie>,
    pub error_message: Option<String>,
}

impl UiState for FavoritesState {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum FavoritesAction {
    OnAppear,
    DismissError,
    ToggleFavorite(Movie),
}

#[derive(Clone, Debug, PartialEq)]
pub enum FavoritesIntent {
    Action(FavoritesAction),
    Loaded(Vec<Movie>),
    LoadFailed(String),
    ToggleFailed(String),
}

impl Intent for FavoritesIntent {}

impl From<FavoritesAction> for FavoritesIntent {
    fn from(action: FavoritesAction) -> Self {
        FavoritesIntent::Action(action)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FavoritesCommand {
    Load,
    /// Toggle, then reload so an un-favorited movie leaves the list at once.
    ToggleAndReload(Movie),
}

pub struct FavoritesReducer;

impl Reducer for FavoritesReducer {
    type State = FavoritesState;
    type Intent = FavoritesIntent;
    type Command = FavoritesCommand;

    fn reduce(
        mut state: FavoritesState,
        intent: FavoritesIntent,
    ) -> (FavoritesState, Vec<FavoritesCommand>) {
        match intent {
            FavoritesIntent::Action(FavoritesAction::OnAppear) => {
                return (state, vec![FavoritesCommand::Load]);
            },
            FavoritesIntent::Action(FavoritesAction::DismissError) => state.error_message = None,
            FavoritesIntent::Action(FavoritesAction::ToggleFavorite(movie)) => {
                return (state, vec![FavoritesCommand::ToggleAndReload(movie)]);
            },
            FavoritesIntent::Loaded(movies) => state.movies = movies,
            FavoritesIntent::LoadFailed(message) => {
                state.movies.clear();
                state.error_message = Some(message);
            },
            FavoritesIntent::ToggleFailed(message) => state.error_message = Some(message),
        }
        (state, Vec::new())
    }
}

async fn load(repository: &dyn MovieRepository) -> FavoritesIntent {
    match repository.get_favorites().await {
        Ok(movies) => FavoritesIntent::Loaded(movies),
        Err(err) => {
            warn!(error = %err, "failed to load favorites");
            FavoritesIntent::LoadFailed(err.to_string())
        },
    }
}

#[async_trait]
impl Effect for FavoritesCommand {
    type Intent = FavoritesIntent;

    async fn run(self, repository: Arc<dyn MovieRepository>) -> FavoritesIntent {
        match self {
            FavoritesCommand::Load => load(repository.as_ref()).await,
            FavoritesCommand::ToggleAndReload(mut movie) => {
                if let Err(err) = repository.toggle_favorite(&mut movie).await {
                    return FavoritesIntent::ToggleFailed(err.to_string());
                }
                load(repository.as_ref()).await
            },
        }
    }

    fn failed(&self, message: String) -> FavoritesIntent {
        match self {
            FavoritesCommand::Load => FavoritesIntent::LoadFailed(message),
            FavoritesCommand::ToggleAndReload(_) => FavoritesIntent::ToggleFailed(message),
        }
    }
}

//! Detail screen for a single movie.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Effect, Intent, Reducer, UiState};
use crate::{
    models::{Movie, MovieDetail},
    repository::MovieRepository,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DetailState {
    pub movie: Option<Movie>,
    pub detail: Option<MovieDetail>,
    pub show_trailer: bool,
    pub error_message: Option<String>,
}

impl DetailState {
    pub fn for_movie(movie: Movie) -> Self {
        Self { movie: Some(movie), ..Self::default() }
    }

    pub fn genres(&self) -> String {
        self.detail.as_ref().map(MovieDetail::genre_names).unwrap_or_default()
    }

    pub fn production_countries(&self) -> String {
        self.detail.as_ref().map(MovieDetail::production_country_names).unwrap_or_default()
    }

    pub fn languages(&self) -> String {
        self.detail.as_ref().map(MovieDetail::spoken_language_names).unwrap_or_default()
    }

    pub fn production_companies(&self) -> String {
        self.detail.as_ref().map(MovieDetail::production_company_names).unwrap_or_default()
    }

    /// Empty when the detail is missing or has no YouTube video.
    pub fn youtube_url(&self) -> String {
        self.detail.as_ref().and_then(MovieDetail::trailer_url).unwrap_or_default()
    }
}

impl UiState for DetailState {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DetailAction {
    OnAppear,
    ShowTrailer,
    LikeMovie,
    DismissError,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DetailIntent {
    Action(DetailAction),
    DetailLoaded(Option<MovieDetail>),
    FavoriteToggled { id: i64, is_favorite: bool },
    FavoriteToggleFailed(String),
}

impl Intent for DetailIntent {}

impl From<DetailAction> for DetailIntent {
    fn from(action: DetailAction) -> Self {
        DetailIntent::Action(action)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DetailCommand {
    FetchDetail(i64),
    ToggleFavorite(Movie),
}

pub struct DetailReducer;

impl Reducer for DetailReducer {
    type State = DetailState;
    type Intent = DetailIntent;
    type Command = DetailCommand;

    fn reduce(mut state: DetailState, intent: DetailIntent) -> (DetailState, Vec<DetailCommand>) {
        let mut commands = Vec::new();
        match intent {
            DetailIntent::Action(DetailAction::OnAppear) => {
                if let Some(movie) = &state.movie {
                    commands.push(DetailCommand::FetchDetail(movie.id));
                }
            },
            DetailIntent::Action(DetailAction::ShowTrailer) => {
                state.show_trailer = !state.show_trailer;
            },
            DetailIntent::Action(DetailAction::LikeMovie) => {
                if let Some(movie) = &state.movie {
                    commands.push(DetailCommand::ToggleFavorite(movie.clone()));
                }
            },
            DetailIntent::Action(DetailAction::DismissError) => state.error_message = None,
            DetailIntent::DetailLoaded(detail) => state.detail = detail,
            DetailIntent::FavoriteToggled { id, is_favorite } => {
                if let Some(movie) = state.movie.as_mut().filter(|m| m.id == id) {
                    movie.is_favorite = is_favorite;
                }
            },
            DetailIntent::FavoriteToggleFailed(message) => state.error_message = Some(message),
        }
        (state, commands)
    }
}

#[async_trait]
impl Effect for DetailCommand {
    type Intent = DetailIntent;

    async fn run(self, repository: Arc<dyn MovieRepository>) -> DetailIntent {
        match self {
            DetailCommand::FetchDetail(id) => match repository.get_movie_detail(id).await {
                Ok(detail) => DetailIntent::DetailLoaded(Some(detail)),
                Err(err) => {
                    warn!(id, error = %err, "failed to load movie detail");
                    DetailIntent::DetailLoaded(None)
                },
            },
            DetailCommand::ToggleFavorite(mut movie) => {
                match repository.toggle_favorite(&mut movie).await {
                    Ok(is_favorite) => DetailIntent::FavoriteToggled { id: movie.id, is_favorite },
                    Err(err) => DetailIntent::FavoriteToggleFailed(err.to_string()),
                }
            },
        }
    }

    fn failed(&self, message: String) -> DetailIntent {
        match self {
            DetailCommand::FetchDetail(_) => DetailIntent::DetailLoaded(None),
            DetailCommand::ToggleFavorite(_) => DetailIntent::FavoriteToggleFailed(message),
        }
    }
}

use std::{num::NonZeroU32, sync::Arc};

use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieDetail},
};

/// Where movie listings come from. One call is one request; nothing is retried.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_popular(&self, page: u32) -> AppResult<RemotePage>;
    async fn search(&self, query: &str, page: u32) -> AppResult<RemotePage>;
    async fn fetch_detail(&self, id: i64) -> AppResult<MovieDetail>;
}

/// The paginated envelope shared by the list endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RemotePage {
    pub page: u32,
    pub results: Vec<RemoteMovie>,
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RemoteMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
}

impl RemoteMovie {
    pub fn into_movie(self, cached_at: i64) -> Movie {
        Movie {
            id: self.id,
            title: self.title,
            overview: self.overview,
            poster_path: self.poster_path.unwrap_or_default(),
            release_date: self.release_date.unwrap_or_default(),
            popularity: self.popularity,
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            is_favorite: false,
            cached_at,
        }
    }
}

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        base_url: String,
        language: String,
        rps: u32,
    ) -> Self {
        if api_key.trim().is_empty() {
            tracing::warn!("no TMDB_API_KEY provided, TMDB will reject requests");
        }

        let quota = Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(RateLimiter::direct(quota));
        Self { client, api_key, base_url, language, limiter }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        self.limiter.until_ready().await;

        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        debug!(url = %url, ?params, "tmdb request");

        let resp = self
            .client
            .get(url)
            .query(&[("api_key", &self.api_key), ("language", &self.language)])
            .query(params)
            .send()
            .await
            .map_err(AppError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Server { status: status.as_u16() });
        }

        let body = resp.bytes().await.map_err(AppError::Transport)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl RemoteSource for TmdbClient {
    async fn fetch_popular(&self, page: u32) -> AppResult<RemotePage> {
        self.get_json("/movie/popular", &[("page", page.to_string())]).await
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<RemotePage> {
        self.get_json(
            "/search/movie",
            &[
                ("query", query.to_string()),
                ("page", page.to_string()),
                ("include_adult", "false".to_string()),
            ],
        )
        .await
    }

    async fn fetch_detail(&self, id: i64) -> AppResult<MovieDetail> {
        self.get_json(&format!("/movie/{id}"), &[("append_to_response", "videos".to_string())])
            .await
    }
}

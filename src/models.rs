use serde::{Deserialize, Serialize};

/// `total_pages` reported for a page served from the local cache.
///
/// The real page count is unknown until the server answers, so the cached
/// page must never make page 2 look out of range.
pub const UNBOUNDED_TOTAL_PAGES: u32 = u32::MAX;

/// Full-size poster images.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/original";

const YOUTUBE_SITE: &str = "YouTube";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: String,
    pub release_date: String,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: i64,
    /// Projected from the favorites table whenever the repository hands out a movie.
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub cached_at: i64,
}

impl Movie {
    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        let path = self.poster_path.trim_start_matches('/');
        (!path.is_empty()).then(|| format!("{}/{}", image_base_url.trim_end_matches('/'), path))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Favorite {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: String,
    pub release_date: String,
    pub popularity: f64,
    pub vote_average: f64,
    pub vote_count: i64,
    pub created_at: i64,
}

impl Favorite {
    /// Copies the movie's current fields; later cache changes do not reach the snapshot.
    pub fn snapshot(movie: &Movie, created_at: i64) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            poster_path: movie.poster_path.clone(),
            release_date: movie.release_date.clone(),
            popularity: movie.popularity,
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            created_at,
        }
    }

    pub fn into_movie(self) -> Movie {
        Movie {
            id: self.id,
            title: self.title,
            overview: self.overview,
            poster_path: self.poster_path,
            release_date: self.release_date,
            popularity: self.popularity,
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            is_favorite: true,
            cached_at: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum PageSource {
    Cache,
    Remote,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MoviePage {
    pub movies: Vec<Movie>,
    pub current_page: u32,
    pub total_pages: u32,
    pub source: PageSource,
}

impl MoviePage {
    pub fn cached(movies: Vec<Movie>) -> Self {
        Self {
            movies,
            current_page: 1,
            total_pages: UNBOUNDED_TOTAL_PAGES,
            source: PageSource::Cache,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.source == PageSource::Cache
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub origin_country: Vec<String>,
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
    #[serde(default)]
    pub production_countries: Vec<ProductionCountry>,
    #[serde(default)]
    pub spoken_languages: Vec<SpokenLanguage>,
    #[serde(default)]
    pub videos: VideoList,
}

impl MovieDetail {
    pub fn genre_names(&self) -> String {
        join_names(self.genres.iter().map(|g| g.name.as_str()))
    }

    pub fn production_company_names(&self) -> String {
        join_names(self.production_companies.iter().map(|c| c.name.as_str()))
    }

    pub fn production_country_names(&self) -> String {
        join_names(self.production_countries.iter().map(|c| c.name.as_str()))
    }

    pub fn spoken_language_names(&self) -> String {
        join_names(self.spoken_languages.iter().map(|l| l.name.as_str()))
    }

    /// First YouTube trailer, if any. Other sites have no URL we can build.
    pub fn trailer_url(&self) -> Option<String> {
        self.videos.results.iter().find_map(Video::youtube_url)
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionCompany {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionCountry {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpokenLanguage {
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
}

impl Video {
    pub fn youtube_url(&self) -> Option<String> {
        (self.site == YOUTUBE_SITE).then(|| format!("https://www.youtube.com/watch?v={}", self.key))
    }
}

pub mod favorite_movie;
pub mod movie_cache;

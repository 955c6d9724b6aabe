use anyhow::Context;
use time::OffsetDateTime;
use tracing::{debug, info};

use super::form::ValidMovie;
use super::repo_types::{Movie, NewMovie};
use crate::error::AppError;
use crate::state::AppState;

pub const POSTERS_PATH: &str = "/api/v1/posters";

/// URL under which `GET /api/v1/posters/:filename` serves a stored poster.
pub fn poster_url(filename: &str) -> String {
    format!("{}/{}", POSTERS_PATH, filename)
}

/// Saves the poster (overwriting any file with the same name), then inserts
/// the row. The file is not removed if the insert fails.
pub async fn create_movie(st: &AppState, movie: ValidMovie) -> Result<Movie, AppError> {
    let poster = match movie.poster {
        Some(p) => {
            st.storage
                .put_object(&p.filename, p.body)
                .await
                .with_context(|| format!("save poster {}", p.filename))?;
            debug!(filename = %p.filename, "poster saved");
            Some(p.filename)
        }
        None => None,
    };

    let created = st
        .movies
        .create(NewMovie {
            title: movie.title,
            description: movie.description,
            poster,
            created_at: OffsetDateTime::now_utc(),
        })
        .await?;

    info!(movie_id = created.id, title = %created.title, "movie created");
    Ok(created)
}

pub async fn list_movies(st: &AppState) -> Result<Vec<Movie>, AppError> {
    Ok(st.movies.list_all().await?)
}

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use super::dto::{CreateMovieResponse, CreatedMovie, MovieListItem, MoviesResponse};
use super::form::MovieForm;
use super::services::{create_movie, list_movies, poster_url};
use crate::{csrf::services::CsrfKeys, error::AppError, state::AppState, storage::content_type_for};

const CSRF_HEADERS: [&str; 2] = ["x-csrftoken", "x-csrf-token"];

// --- public routers ---

pub fn movie_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/movies", get(get_movies).post(post_movie))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

pub fn poster_routes() -> Router<AppState> {
    Router::new().route("/posters/:filename", get(get_poster))
}

// --- handlers ---

/// POST /api/v1/movies (multipart: title, description, poster, csrf_token)
#[instrument(skip(state, keys, headers, mp))]
pub async fn post_movie(
    State(state): State<AppState>,
    State(keys): State<CsrfKeys>,
    headers: HeaderMap,
    mp: Multipart,
) -> Result<Json<CreateMovieResponse>, AppError> {
    let form = MovieForm::from_multipart(mp).await?;

    let header_token = CSRF_HEADERS
        .iter()
        .find_map(|h| headers.get(*h))
        .and_then(|v| v.to_str().ok());

    let movie = match form.validate(&keys, header_token) {
        Ok(m) => m,
        Err(errors) => {
            let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
            warn!(?fields, "movie form rejected");
            return Ok(Json(CreateMovieResponse::Invalid {
                errors: errors.iter().map(ToString::to_string).collect(),
            }));
        }
    };

    let created = create_movie(&state, movie).await?;

    Ok(Json(CreateMovieResponse::Created {
        data: CreatedMovie {
            message: "Movie successfully added".into(),
            poster: created.poster.as_deref().map(poster_url),
            title: created.title,
            description: created.description,
        },
    }))
}

/// GET /api/v1/movies
#[instrument(skip(state))]
pub async fn get_movies(State(state): State<AppState>) -> Result<Json<MoviesResponse>, AppError> {
    let movies = list_movies(&state)
        .await?
        .into_iter()
        .map(|m| MovieListItem {
            poster: m.poster.as_deref().map(poster_url),
            id: m.id,
            title: m.title,
            description: m.description,
        })
        .collect();
    Ok(Json(MoviesResponse { movies }))
}

/// GET /api/v1/posters/:filename
#[instrument(skip(state))]
pub async fn get_poster(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let body = state
        .storage
        .get_object(&filename)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(([(header::CONTENT_TYPE, content_type_for(&filename))], body).into_response())
}

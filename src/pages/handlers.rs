use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    error::AppError,
    state::AppState,
    storage::{content_type_for, resolve_in},
};

const NOT_FOUND_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>404 - Page Not Found</title>
</head>
<body>
  <h1>404 - Page Not Found</h1>
  <p>Sorry, the page you are looking for could not be found.</p>
  <p><a href="/">Return to the home page</a></p>
</body>
</html>
"#;

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
}

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/:file_name", get(text_file))
}

pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "This is the beginning of our API",
    })
}

/// GET /<name>.txt, served from the static folder.
#[instrument(skip(state))]
pub async fn text_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, AppError> {
    match file_name.strip_suffix(".txt") {
        Some(stem) if !stem.is_empty() => {}
        _ => return Err(AppError::NotFound),
    }
    let path = resolve_in(&state.config.static_folder, &file_name).ok_or(AppError::NotFound)?;
    match tokio::fs::read(&path).await {
        Ok(body) => Ok(([(header::CONTENT_TYPE, content_type_for(&file_name))], body).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("read {}", path.display()))
            .into()),
    }
}

pub async fn not_found() -> Response {
    not_found_page()
}

pub fn not_found_page() -> Response {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_HTML)).into_response()
}

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use super::services::CsrfKeys;
use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

pub fn csrf_routes() -> Router<AppState> {
    Router::new().route("/csrf-token", get(get_csrf_token))
}

#[instrument(skip(keys))]
pub async fn get_csrf_token(
    State(keys): State<CsrfKeys>,
) -> Result<Json<CsrfTokenResponse>, AppError> {
    let csrf_token = keys.issue()?;
    Ok(Json(CsrfTokenResponse { csrf_token }))
}

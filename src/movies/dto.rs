use serde::Serialize;

/// One entry of `GET /api/v1/movies`.
#[derive(Debug, Serialize)]
pub struct MovieListItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub poster: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    pub movies: Vec<MovieListItem>,
}

#[derive(Debug, Serialize)]
pub struct CreatedMovie {
    pub message: String,
    pub title: String,
    pub poster: Option<String>,
    pub description: String,
}

/// Body of `POST /api/v1/movies`: either `{"data": ..}` or `{"errors": [..]}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CreateMovieResponse {
    Created { data: CreatedMovie },
    Invalid { errors: Vec<String> },
}

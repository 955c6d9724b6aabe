use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Movie record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub poster: Option<String>,   // sanitized filename inside the upload folder
    pub created_at: OffsetDateTime,
}

/// Values for a row that does not exist yet; the id comes from the database.
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub poster: Option<String>,
    pub created_at: OffsetDateTime,
}

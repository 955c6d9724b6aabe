use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{Movie, NewMovie};

/// Column widths of `movies.title` and `movies.poster`, in characters.
pub const TITLE_MAX_LEN: usize = 100;
pub const POSTER_MAX_LEN: usize = 255;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("movie rejected: {0}")]
    Rejected(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn create(&self, new: NewMovie) -> Result<Movie, StoreError>;
    /// Every movie, oldest first.
    async fn list_all(&self) -> Result<Vec<Movie>, StoreError>;
}

fn check_new_movie(new: &NewMovie) -> Result<(), StoreError> {
    if new.title.trim().is_empty() {
        return Err(StoreError::Rejected("title must not be empty"));
    }
    if new.title.chars().count() > TITLE_MAX_LEN {
        return Err(StoreError::Rejected("title is too long"));
    }
    if new.description.trim().is_empty() {
        return Err(StoreError::Rejected("description must not be empty"));
    }
    if new.poster.as_ref().is_some_and(|p| p.chars().count() > POSTER_MAX_LEN) {
        return Err(StoreError::Rejected("poster filename is too long"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PgMovieStore {
    db: PgPool,
}

impl PgMovieStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn create(&self, new: NewMovie) -> Result<Movie, StoreError> {
        check_new_movie(&new)?;
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (title, description, poster, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, poster, created_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.poster.as_deref()) // Option<&str> → NULL allowed
        .bind(new.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(movie)
    }

    async fn list_all(&self) -> Result<Vec<Movie>, StoreError> {
        let rows = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, description, poster, created_at
              FROM movies
             ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
pub use memory::MemoryMovieStore;

#[cfg(test)]
mod memory {
    use std::sync::Mutex;

    use super::*;

    /// Keeps rows in a vector; ids start at 1 like a fresh SERIAL column.
    #[derive(Default)]
    pub struct MemoryMovieStore {
        rows: Mutex<Vec<Movie>>,
    }

    #[async_trait]
    impl MovieStore for MemoryMovieStore {
        async fn create(&self, new: NewMovie) -> Result<Movie, StoreError> {
            check_new_movie(&new)?;
            let mut rows = self.rows.lock().unwrap();
            let movie = Movie {
                id: rows.len() as i32 + 1,
                title: new.title,
                description: new.description,
                poster: new.poster,
                created_at: new.created_at,
            };
            rows.push(movie.clone());
            Ok(movie)
        }

        async fn list_all(&self) -> Result<Vec<Movie>, StoreError> {
            Ok(self.rows.lock().unwrap().clone())
        }
    }
}

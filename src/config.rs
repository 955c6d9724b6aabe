use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CsrfConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub upload_folder: PathBuf,
    pub static_folder: PathBuf,
    pub max_upload_bytes: usize,
    pub csrf: CsrfConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let csrf = CsrfConfig {
            secret: std::env::var("SECRET_KEY")?,
            issuer: std::env::var("CSRF_ISSUER").unwrap_or_else(|_| "movieshelf".into()),
            audience: std::env::var("CSRF_AUDIENCE").unwrap_or_else(|_| "csrf".into()),
            ttl_minutes: std::env::var("CSRF_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            enabled: std::env::var("CSRF_ENABLED")
                .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
        };
        Ok(Self {
            database_url,
            upload_folder: std::env::var("UPLOAD_FOLDER")
                .unwrap_or_else(|_| "./uploads".into())
                .into(),
            static_folder: std::env::var("STATIC_FOLDER")
                .unwrap_or_else(|_| "./static".into())
                .into(),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(16 * 1024 * 1024),
            csrf,
        })
    }
}

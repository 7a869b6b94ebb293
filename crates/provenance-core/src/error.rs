//! Error types for the provenance-scan system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Transfer history provider error: {message}")]
    Provider { message: String },

    #[error("Analysis already running for artist {artist}")]
    AnalysisInProgress { artist: String },
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Could not open scoreboard at {path}: {source}")]
    StorageOpen {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Scoreboard query failed: {0}")]
    StorageQuery(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Corrupt scoreboard row: {0}")]
    Corrupt(String),
}

impl ScoreError {
    /// Whether the error came from the storage medium rather than the caller
    pub fn is_storage(&self) -> bool {
        !matches!(self, ScoreError::Validation(_))
    }
}

pub type ScoreResult<T> = Result<T, ScoreError>;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP status {code}: {reason}")]
    HttpStatus { code: u16, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalonError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl SalonError {
    /// Whether the caller may retry the request with different input.
    ///
    /// Only slot conflicts qualify: the client is expected to re-fetch free
    /// slots and pick another time.
    pub fn is_retryable_with_new_input(&self) -> bool {
        matches!(self, SalonError::Conflict(_))
    }
}

pub type SalonResult<T> = Result<T, SalonError>;

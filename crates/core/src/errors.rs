use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl PlannerError {
    /// Short machine-readable code used in the JSON error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            PlannerError::BadRequest(_) => "bad_request",
            PlannerError::Unauthorized(_) => "unauthorized",
            PlannerError::Forbidden(_) => "forbidden",
            PlannerError::NotFound(_) => "not_found",
            PlannerError::Conflict(_) => "conflict",
            PlannerError::Database(_) | PlannerError::Internal(_) => "internal",
        }
    }

    /// True for failures whose detail must stay server-side.
    pub fn is_internal(&self) -> bool {
        matches!(self, PlannerError::Database(_) | PlannerError::Internal(_))
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("invalid intake: {0}")]
    Validation(String),

    #[error("intake {0} is completed and can no longer be modified")]
    ImmutableRecord(Uuid),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: Uuid },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DiagnosticError>;

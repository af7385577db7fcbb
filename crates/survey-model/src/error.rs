use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid bins: {reason}")]
    InvalidBins { reason: String },
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

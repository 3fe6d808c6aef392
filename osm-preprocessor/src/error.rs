use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

pub type Result<T, E = PreprocessError> = std::result::Result<T, E>;

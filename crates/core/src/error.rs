use thiserror::Error;

/// Errors raised while decoding query wire shapes
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid subject reference: {0}")]
    InvalidReference(String),
}

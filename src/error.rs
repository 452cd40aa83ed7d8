use thiserror::Error;

/// Errors produced while loading, preprocessing or training
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or truncated IDX input
    #[error("format error: {0}")]
    Format(String),

    /// An operand does not have the dimensions the operation expects
    #[error("shape error: {0}")]
    Shape(String),

    /// The eigen-decomposition could not be computed
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),

    /// The input file could not be opened
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<ndarray::ShapeError> for Error {
    fn from(err: ndarray::ShapeError) -> Self {
        Error::Shape(err.to_string())
    }
}

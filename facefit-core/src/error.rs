/// Error types shared by the facefit pipeline
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OBJ parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("landmark set has {found} points, topology expects {expected}")]
    TopologyMismatch { expected: usize, found: usize },

    #[error("landmark {index} is missing from the landmark set")]
    MissingLandmark { index: usize },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

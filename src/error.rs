use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodeBeastError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CodeBeastError {
    /// True for failures of the transport to an upstream service.
    pub fn is_connection(&self) -> bool {
        matches!(self, CodeBeastError::Connection(_) | CodeBeastError::Network(_))
    }
}

pub type Result<T> = std::result::Result<T, CodeBeastError>;

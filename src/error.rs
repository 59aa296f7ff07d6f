use serde::Serialize;
use thiserror::Error;

/// Stable identifier for each error variant, as reported to worker clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ImageProcessingFailed,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ImageProcessingFailed => "IMAGE_PROCESSING_FAILED",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input could not be decoded or geometrically transformed.
    #[error("image processing failed: {message}")]
    ImageProcessingFailed { message: String },
}

impl Error {
    pub fn image_processing(message: impl Into<String>) -> Self {
        Error::ImageProcessingFailed {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ImageProcessingFailed { .. } => ErrorKind::ImageProcessingFailed,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Error::ImageProcessingFailed { message } => message,
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::image_processing(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

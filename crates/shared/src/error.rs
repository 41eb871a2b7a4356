use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON error body returned by the prediction service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    Unavailable,
    Internal,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("No image uploaded")]
    NoImageUploaded,
    #[error("No selected image")]
    NoSelectedImage,
    #[error("Model not loaded")]
    ModelNotLoaded,
    #[error("{0}")]
    Preprocess(String),
    #[error("{0}")]
    Inference(String),
}

impl ServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoImageUploaded | Self::NoSelectedImage => ErrorCode::Validation,
            Self::ModelNotLoaded => ErrorCode::Unavailable,
            Self::Preprocess(_) | Self::Inference(_) => ErrorCode::Internal,
        }
    }
}

impl From<ServiceError> for ErrorBody {
    fn from(value: ServiceError) -> Self {
        Self::new(value.to_string())
    }
}

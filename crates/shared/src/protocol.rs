use serde::{Deserialize, Serialize};

use crate::domain::HealthState;

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";
pub const PREDICT_PATH: &str = "/predict";
pub const HEALTH_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthState,
    pub message: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: HealthState::Healthy,
            message: "Service is running".to_string(),
        }
    }

    pub fn model_missing() -> Self {
        Self {
            status: HealthState::Error,
            message: "Model not loaded".to_string(),
        }
    }
}

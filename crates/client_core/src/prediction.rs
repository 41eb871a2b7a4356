use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use shared::{
    error::ErrorBody,
    protocol::{HealthResponse, PredictResponse, HEALTH_PATH, IMAGE_FIELD},
};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{
    config::{ConfigError, Settings},
    file_selection::SelectedImage,
    SERVER_UNREACHABLE_MESSAGE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    pub label: String,
}

impl PredictionResult {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

/// User-facing failure; never carries the underlying transport cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{user_message}")]
pub struct SubmissionError {
    pub user_message: String,
}

impl SubmissionError {
    pub fn unreachable() -> Self {
        Self {
            user_message: SERVER_UNREACHABLE_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PredictionTransportError {
    #[error("request to prediction service failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("prediction service answered {status} ({})", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("malformed prediction service response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("prediction response carried an empty label")]
    EmptyLabel,
}

/// Seam between the workflow and the remote prediction service.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, image: &SelectedImage) -> Result<PredictionResult, SubmissionError>;
}

pub struct PredictionClient {
    http: Client,
    predict_url: Url,
}

impl PredictionClient {
    pub fn new(predict_url: Url) -> Self {
        Self {
            http: Client::new(),
            predict_url,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let predict_url = settings.predict_url()?;
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            predict_url,
        })
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }

    pub async fn submit(
        &self,
        raw_bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<PredictionResult, SubmissionError> {
        let file_name = default_file_name(mime_type);
        self.submit_named(raw_bytes, mime_type, &file_name).await
    }

    /// Issues exactly one multipart POST. Every failure collapses into
    /// [`SubmissionError::unreachable`]; the cause is only logged.
    pub async fn submit_named(
        &self,
        raw_bytes: Vec<u8>,
        mime_type: &str,
        file_name: &str,
    ) -> Result<PredictionResult, SubmissionError> {
        let size_bytes = raw_bytes.len();
        match self.try_submit(raw_bytes, mime_type, file_name).await {
            Ok(result) => {
                info!(
                    endpoint = %self.predict_url,
                    size_bytes,
                    label = %result.label,
                    "prediction received"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(endpoint = %self.predict_url, size_bytes, error = %err, "prediction request failed");
                Err(SubmissionError::unreachable())
            }
        }
    }

    async fn try_submit(
        &self,
        raw_bytes: Vec<u8>,
        mime_type: &str,
        file_name: &str,
    ) -> Result<PredictionResult, PredictionTransportError> {
        let part = Part::bytes(raw_bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .http
            .post(self.predict_url.clone())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.json::<ErrorBody>().await.ok().map(|body| body.error);
            return Err(PredictionTransportError::Status { status, detail });
        }

        let body = response.bytes().await?;
        let parsed: PredictResponse = serde_json::from_slice(&body)?;
        if parsed.prediction.trim().is_empty() {
            return Err(PredictionTransportError::EmptyLabel);
        }
        Ok(PredictionResult::new(parsed.prediction))
    }

    /// Queries the service root, where the prediction service reports whether
    /// its model is loaded.
    pub async fn health(&self) -> Result<HealthResponse, PredictionTransportError> {
        let url = self
            .predict_url
            .join(HEALTH_PATH)
            .unwrap_or_else(|_| self.predict_url.clone());
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let detail = serde_json::from_slice::<HealthResponse>(&body)
                .ok()
                .map(|health| health.message);
            return Err(PredictionTransportError::Status { status, detail });
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Predictor for PredictionClient {
    async fn predict(&self, image: &SelectedImage) -> Result<PredictionResult, SubmissionError> {
        let file_name = if image.file_name.trim().is_empty() {
            default_file_name(&image.mime_type)
        } else {
            image.file_name.clone()
        };
        self.submit_named(image.raw_bytes.clone(), &image.mime_type, &file_name)
            .await
    }
}

/// The service rejects uploads without a file name, so one is always sent.
fn default_file_name(mime_type: &str) -> String {
    let extension = mime_type
        .strip_prefix("image/")
        .and_then(|subtype| subtype.split(['+', ';']).next())
        .map(str::trim)
        .filter(|subtype| !subtype.is_empty())
        .unwrap_or("bin");
    format!("image.{extension}")
}

#[cfg(test)]
#[path = "tests/prediction_tests.rs"]
mod tests;

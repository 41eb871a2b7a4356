use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::Label,
    error::{ErrorBody, ErrorCode, ServiceError},
    protocol::{HealthResponse, PredictResponse, HEALTH_PATH, IMAGE_FIELD, PREDICT_PATH},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

mod classifier;
mod config;
mod preprocess;

use classifier::{Classifier, MissingClassifier};
use config::load_settings;
use preprocess::preprocess;

struct AppState {
    classifier: Arc<dyn Classifier>,
    max_upload_bytes: usize,
}

struct UploadedImage {
    file_name: String,
    bytes: Vec<u8>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorBody>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let classifier: Arc<dyn Classifier> = Arc::new(MissingClassifier);
    if !classifier.is_ready() {
        warn!("no classifier backend available; /predict will answer \"Model not loaded\"");
    }

    let state = AppState {
        classifier,
        max_upload_bytes: settings.max_upload_bytes,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, max_upload_bytes = settings.max_upload_bytes, "prediction service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route(HEALTH_PATH, get(health_check))
        .route(PREDICT_PATH, post(predict))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(limit))
        .with_state(state)
}

fn reject(err: ServiceError) -> (StatusCode, Json<ErrorBody>) {
    let status = match err.code() {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Unavailable | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(err.into()))
}

async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    if state.classifier.is_ready() {
        (StatusCode::OK, Json(HealthResponse::healthy()))
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse::model_missing()),
        )
    }
}

async fn predict(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<PredictResponse> {
    let Ok(multipart) = multipart else {
        return Err(reject(ServiceError::NoImageUploaded));
    };
    let upload = read_image_field(multipart).await?;
    if upload.file_name.trim().is_empty() {
        return Err(reject(ServiceError::NoSelectedImage));
    }

    let tensor = preprocess(&upload.bytes).map_err(|err| {
        warn!(file = %upload.file_name, %err, "failed to decode uploaded image");
        reject(ServiceError::Preprocess(err.to_string()))
    })?;

    if !state.classifier.is_ready() {
        return Err(reject(ServiceError::ModelNotLoaded));
    }
    let score = state.classifier.score(&tensor).map_err(|err| {
        warn!(file = %upload.file_name, %err, "classifier failed");
        reject(ServiceError::Inference(err.to_string()))
    })?;

    let label = Label::from_score(score);
    info!(
        file = %upload.file_name,
        size_bytes = upload.bytes.len(),
        score,
        %label,
        "prediction served"
    );
    Ok(Json(PredictResponse {
        prediction: label.to_string(),
    }))
}

/// Returns the first `image` part that was sent as a file.
async fn read_image_field(
    mut multipart: Multipart,
) -> Result<UploadedImage, (StatusCode, Json<ErrorBody>)> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(reject(ServiceError::NoImageUploaded)),
            Err(err) => {
                warn!(%err, "malformed multipart body");
                return Err(reject(ServiceError::NoImageUploaded));
            }
        };
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(|err| {
            warn!(%err, "failed to read uploaded image");
            reject(ServiceError::Preprocess(err.body_text()))
        })?;
        return Ok(UploadedImage {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::{debug, warn};

use crate::events::{SelectionId, WorkflowEvent};

/// A user-chosen file: its name, declared MIME type and binary content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads `path` from disk, accepting only `image/*` types the way a file
    /// picker filter would.
    pub async fn load(path: &Path) -> Result<Self, ReadError> {
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !mime_type.starts_with("image/") {
            return Err(ReadError::NotAnImage {
                path: path.to_path_buf(),
                mime_type,
            });
        }

        let bytes = tokio::fs::read(path).await.map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();

        Ok(Self::new(name, mime_type, bytes))
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("'{}' is not an image (detected {mime_type})", .path.display())]
    NotAnImage { path: PathBuf, mime_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub file_name: String,
    pub mime_type: String,
    pub raw_bytes: Vec<u8>,
    pub preview_data: Option<String>,
}

/// Turns file content into a displayable data-URI.
#[async_trait]
pub trait ImageReader: Send + Sync {
    async fn read_as_data_url(&self, file: &ImageFile) -> Result<String>;
}

/// Encodes in memory; never fails.
pub struct DataUrlReader;

#[async_trait]
impl ImageReader for DataUrlReader {
    async fn read_as_data_url(&self, file: &ImageFile) -> Result<String> {
        Ok(encode_data_url(&file.mime_type, &file.bytes))
    }
}

pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Starts preview reads and reports each outcome exactly once as a
/// [`WorkflowEvent`] tagged with its selection.
pub struct FileSelectionHandler {
    reader: Arc<dyn ImageReader>,
    events: UnboundedSender<WorkflowEvent>,
}

impl FileSelectionHandler {
    pub fn new(reader: Arc<dyn ImageReader>, events: UnboundedSender<WorkflowEvent>) -> Self {
        Self { reader, events }
    }

    pub fn select(&self, selection: SelectionId, file: ImageFile) -> JoinHandle<()> {
        let reader = Arc::clone(&self.reader);
        let events = self.events.clone();
        debug!(
            selection = selection.0,
            file = %file.name,
            mime_type = %file.mime_type,
            size_bytes = file.bytes.len(),
            "reading selected image"
        );

        let file_name = file.name.clone();
        let read = tokio::spawn(async move {
            let result = reader.read_as_data_url(&file).await;
            (file, result)
        });

        tokio::spawn(async move {
            let event = match read.await {
                Ok((file, Ok(preview))) => WorkflowEvent::ReadCompleted {
                    selection,
                    image: SelectedImage {
                        file_name: file.name,
                        mime_type: file.mime_type,
                        raw_bytes: file.bytes,
                        preview_data: Some(preview),
                    },
                },
                Ok((_, Err(err))) => {
                    warn!(selection = selection.0, file = %file_name, %err, "image read failed");
                    WorkflowEvent::ReadFailed {
                        selection,
                        reason: err.to_string(),
                    }
                }
                Err(err) => {
                    warn!(selection = selection.0, file = %file_name, %err, "image read task aborted");
                    WorkflowEvent::ReadFailed {
                        selection,
                        reason: err.to_string(),
                    }
                }
            };
            if events.send(event).is_err() {
                debug!(selection = selection.0, "workflow dropped before read completed");
            }
        })
    }
}

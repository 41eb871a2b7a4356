//! Client side of the upload / preview / predict workflow.
//!
//! The [`WorkflowController`] owns the only mutable process state: the current
//! [`WorkflowPhase`] and the [`SelectedImage`]. File reads and prediction calls
//! run as spawned tasks that report back through [`WorkflowEvent`]s.

pub mod config;
pub mod events;
pub mod file_selection;
pub mod prediction;
pub mod preview;
pub mod view;
pub mod workflow;

pub use config::{load_settings, ConfigError, Settings};
pub use events::{SelectionId, SubmissionId, WorkflowEvent};
pub use file_selection::{
    encode_data_url, DataUrlReader, FileSelectionHandler, ImageFile, ImageReader, ReadError,
    SelectedImage,
};
pub use prediction::{
    PredictionClient, PredictionResult, PredictionTransportError, Predictor, SubmissionError,
};
pub use preview::{render_preview, PreviewView};
pub use view::{StatusLine, WorkflowView};
pub use workflow::{SubmitOutcome, WorkflowController, WorkflowPhase};

/// Shown when submit is requested before any image was selected.
pub const NO_IMAGE_SELECTED_MESSAGE: &str = "Please select an image before uploading";
/// Shown for every transport-level prediction failure.
pub const SERVER_UNREACHABLE_MESSAGE: &str = "Unable to connect to the server";

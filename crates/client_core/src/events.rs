//! Completion events delivered from spawned reads and prediction calls back to
//! the workflow controller.

use crate::{
    file_selection::SelectedImage,
    prediction::{PredictionResult, SubmissionError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionId(pub u64);

#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    ReadCompleted {
        selection: SelectionId,
        image: SelectedImage,
    },
    ReadFailed {
        selection: SelectionId,
        reason: String,
    },
    PredictionResolved {
        submission: SubmissionId,
        outcome: Result<PredictionResult, SubmissionError>,
    },
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReadCompleted { .. } => "read_completed",
            Self::ReadFailed { .. } => "read_failed",
            Self::PredictionResolved { .. } => "prediction_resolved",
        }
    }
}
